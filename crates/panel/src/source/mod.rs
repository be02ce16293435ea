//! Log sources — background pollers that feed the console buffer.
//!
//! Every source runs the same ingest stage: normalize the raw chunk, append
//! each finished line to the shared [`RingBuffer`], detect player events and
//! hand them to the [`Notifier`]. Sources run under a [`Supervisor`] that
//! restarts them after a backoff; they never stop on their own.
//!
//! Known limitation: no cancellation token reaches the pollers. They block
//! on their next chunk or their poll sleep and end with the process.

pub mod container;
pub mod file;
pub mod supervisor;

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::console::RingBuffer;
use crate::docker::DockerError;
use crate::notify::Notifier;
use crate::parser::{detect, LineNormalizer};

pub use container::ContainerLogPoller;
pub use file::FileTailPoller;
pub use supervisor::Supervisor;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Docker(#[from] DockerError),
    #[error("Container is not running: {0} ({1})")]
    NotRunning(String, String),
    #[error("Log file disappeared: {0}")]
    FileMissing(PathBuf),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where a poller currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SourceState {
    Connecting = 0,
    Streaming = 1,
    Backoff = 2,
    WaitingForFile = 3,
    Tailing = 4,
}

impl SourceState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => SourceState::Streaming,
            2 => SourceState::Backoff,
            3 => SourceState::WaitingForFile,
            4 => SourceState::Tailing,
            _ => SourceState::Connecting,
        }
    }

    /// True while the source is delivering output.
    pub fn is_live(&self) -> bool {
        matches!(self, SourceState::Streaming | SourceState::Tailing)
    }
}

/// Lock-free status a poller publishes for the status endpoint.
#[derive(Debug)]
pub struct SourceHealth {
    name: &'static str,
    state: AtomicU8,
    consecutive_failures: AtomicU64,
    lines_ingested: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStatus {
    pub name: &'static str,
    pub state: SourceState,
    pub consecutive_failures: u64,
    pub lines_ingested: u64,
}

impl SourceHealth {
    pub fn new(name: &'static str, initial: SourceState) -> Self {
        Self {
            name,
            state: AtomicU8::new(initial as u8),
            consecutive_failures: AtomicU64::new(0),
            lines_ingested: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> SourceState {
        SourceState::from_u8(self.state.load(Ordering::Relaxed))
    }

    pub fn set_state(&self, next: SourceState) {
        let previous = SourceState::from_u8(self.state.swap(next as u8, Ordering::Relaxed));
        if previous != next {
            debug!(source = self.name, from = ?previous, to = ?next, "Source state changed");
        }
    }

    /// Count a failed cycle; returns the new consecutive count.
    pub fn record_failure(&self) -> u64 {
        self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn clear_failures(&self) {
        self.consecutive_failures.store(0, Ordering::Relaxed);
    }

    pub fn record_lines(&self, count: usize) {
        self.lines_ingested.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn status(&self) -> SourceStatus {
        SourceStatus {
            name: self.name,
            state: self.state(),
            consecutive_failures: self.consecutive_failures.load(Ordering::Relaxed),
            lines_ingested: self.lines_ingested.load(Ordering::Relaxed),
        }
    }
}

/// The shared pipeline stage: normalize → append → detect → notify.
#[derive(Clone)]
pub struct Ingest {
    buffer: Arc<RingBuffer>,
    notifier: Arc<dyn Notifier>,
}

impl Ingest {
    pub fn new(buffer: Arc<RingBuffer>, notifier: Arc<dyn Notifier>) -> Self {
        Self { buffer, notifier }
    }

    /// Run one raw chunk through the pipeline using the caller's normalizer.
    ///
    /// Returns the number of lines appended.
    pub fn feed(&self, normalizer: &mut LineNormalizer, chunk: &[u8]) -> usize {
        let lines = normalizer.normalize(chunk);
        let count = lines.len();
        for line in lines {
            let event = detect(&line);
            self.buffer.append(line);
            if let Some(event) = event {
                self.notifier.notify(&event.message(), event.kind.as_str());
            }
        }
        count
    }
}

/// A restartable log source driven by the [`Supervisor`].
///
/// Object-safe thanks to the `Pin<Box<…>>` return of `run_cycle`.
pub trait LogSource: Send {
    fn health(&self) -> Arc<SourceHealth>;

    /// One connect-and-consume cycle. Returns when the source ends or fails.
    fn run_cycle(&mut self) -> Pin<Box<dyn Future<Output = Result<(), SourceError>> + Send + '_>>;

    /// Discard per-connection state after a cycle ends.
    fn reset(&mut self);

    /// Pause before the next cycle.
    fn backoff(&self) -> Duration;

    /// State published while waiting out the backoff.
    fn backoff_state(&self) -> SourceState {
        SourceState::Backoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::testing::RecordingNotifier;

    #[test]
    fn test_feed_appends_and_notifies() {
        let buffer = Arc::new(RingBuffer::new(10));
        let recorder = Arc::new(RecordingNotifier::default());
        let ingest = Ingest::new(Arc::clone(&buffer), recorder.clone());
        let mut normalizer = LineNormalizer::default();

        let appended = ingest.feed(&mut normalizer, b"Steve has joined.\n[Server] World saved\nAlex has le");
        assert_eq!(appended, 2);
        assert_eq!(buffer.lines_since(0).lines, vec!["Steve has joined.", "[Server] World saved"]);

        ingest.feed(&mut normalizer, b"ft.\n");
        let seen = recorder.seen.lock();
        assert_eq!(
            *seen,
            vec![
                ("**Steve** joined the server".to_string(), "join".to_string()),
                ("**Alex** left the server".to_string(), "leave".to_string()),
            ]
        );
    }

    #[test]
    fn test_health_tracks_state_and_failures() {
        let health = SourceHealth::new("container", SourceState::Connecting);
        assert!(!health.state().is_live());
        health.set_state(SourceState::Streaming);
        assert!(health.state().is_live());

        assert_eq!(health.record_failure(), 1);
        assert_eq!(health.record_failure(), 2);
        health.clear_failures();
        health.record_lines(3);

        let status = health.status();
        assert_eq!(status.consecutive_failures, 0);
        assert_eq!(status.lines_ingested, 3);
        assert_eq!(status.state, SourceState::Streaming);
    }
}
