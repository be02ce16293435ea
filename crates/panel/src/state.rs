use std::sync::Arc;

use crate::command::CommandSender;
use crate::conf::PanelConfig;
use crate::console::{CursorReader, RingBuffer};
use crate::source::{SourceHealth, SourceStatus};

/// State shared by the HTTP handlers.
pub struct PanelState {
    pub config: PanelConfig,
    pub buffer: Arc<RingBuffer>,
    pub cursor: CursorReader,
    pub commands: Arc<dyn CommandSender>,
    pub sources: Vec<Arc<SourceHealth>>,
}

pub type SharedState = Arc<PanelState>;

impl PanelState {
    pub fn new(
        config: PanelConfig,
        buffer: Arc<RingBuffer>,
        commands: Arc<dyn CommandSender>,
        sources: Vec<Arc<SourceHealth>>,
    ) -> Self {
        let cursor = CursorReader::new(Arc::clone(&buffer));
        Self { config, buffer, cursor, commands, sources }
    }

    pub fn source_statuses(&self) -> Vec<SourceStatus> {
        self.sources.iter().map(|s| s.status()).collect()
    }

    /// True when at least one source is currently delivering output.
    pub fn output_available(&self) -> bool {
        self.sources.iter().any(|s| s.state().is_live())
    }
}
