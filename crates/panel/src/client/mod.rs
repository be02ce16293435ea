//! Client module — container collaborator trait with live and fake backends.

pub mod docker;
pub mod fake;
pub mod live;

pub use docker::{ChunkStream, ContainerLogs};
