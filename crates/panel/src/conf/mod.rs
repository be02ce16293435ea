//! Conf module — configuration model and loading.

pub mod model;
pub mod load;

pub use model::{
    CommandConfig, ConsoleConfig, ContainerSourceConfig, FileSourceConfig, NotifyConfig,
    PanelConfig, SupervisorConfig,
};
