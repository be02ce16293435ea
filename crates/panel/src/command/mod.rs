//! Command module — delivering console commands to the server process.
//!
//! The panel never talks to the game server directly: a [`CommandSender`]
//! pushes text into whatever input surface the deployment exposes and reports
//! only whether the hand-off worked. Output comes back through the console
//! buffer like any other line.

pub mod capture;
pub mod fifo;
pub mod screen;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::conf::CommandConfig;

pub use capture::send_and_capture;
pub use fifo::FifoSender;
pub use screen::ScreenSender;

/// Upper bound for a single hand-off to the server's input.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Command-send primitive.
///
/// Object-safe thanks to the `Pin<Box<…>>` return.
pub trait CommandSender: Send + Sync {
    /// Deliver `command`; `true` when the server's input accepted it.
    fn send<'a>(&'a self, command: &'a str) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>>;

    /// Short label for status output.
    fn mode(&self) -> &'static str;
}

/// Used when no input surface is configured. Every send fails.
pub struct DisabledSender;

impl CommandSender for DisabledSender {
    fn send<'a>(&'a self, _command: &'a str) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async { false })
    }

    fn mode(&self) -> &'static str {
        "disabled"
    }
}

/// Build the sender selected by `config`.
pub fn from_config(config: &CommandConfig) -> Arc<dyn CommandSender> {
    match config {
        CommandConfig::Disabled => Arc::new(DisabledSender),
        CommandConfig::Fifo { path } => Arc::new(FifoSender::new(path.clone())),
        CommandConfig::Screen { session } => Arc::new(ScreenSender::new(session.clone())),
    }
}
