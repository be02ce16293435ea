//! File tail poller — follows a server log file on disk by byte offset.
//!
//! The file is reopened on every poll, so a rotated or recreated file is
//! picked up without holding a stale descriptor. A file shorter than the
//! stored offset (or one that cannot be seeked) is read again from the start.

use std::future::Future;
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeek, AsyncSeekExt};
use tokio::time;
use tracing::{debug, info};

use super::{Ingest, LogSource, SourceError, SourceHealth, SourceState};
use crate::conf::FileSourceConfig;
use crate::parser::LineNormalizer;

/// Upper bound on bytes consumed by a single poll.
const MAX_READ_PER_POLL: u64 = 1024 * 1024;

pub struct FileTailPoller {
    path: PathBuf,
    poll_interval: Duration,
    wait_interval: Duration,
    offset: u64,
    ingest: Ingest,
    normalizer: LineNormalizer,
    health: Arc<SourceHealth>,
}

impl FileTailPoller {
    /// `None` when no path is configured; there is nothing to tail.
    pub fn new(config: &FileSourceConfig, ingest: Ingest, max_pending_bytes: usize) -> Option<Self> {
        let path = config.path.clone()?;
        Some(Self {
            path,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            wait_interval: Duration::from_millis(config.wait_interval_ms),
            offset: 0,
            ingest,
            normalizer: LineNormalizer::new(max_pending_bytes),
            health: Arc::new(SourceHealth::new("file", SourceState::WaitingForFile)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn io_error(&self, source: std::io::Error) -> SourceError {
        if source.kind() == ErrorKind::NotFound {
            SourceError::FileMissing(self.path.clone())
        } else {
            SourceError::Io { path: self.path.clone(), source }
        }
    }

    fn restart_from_top(&mut self) {
        self.offset = 0;
        self.normalizer.reset();
    }

    /// Position `file` at the stored offset, or at the top if that fails.
    ///
    /// Regular files accept any offset on Linux; a failed seek comes from
    /// pipes and some network filesystems.
    async fn seek_or_restart<F: AsyncSeek + Unpin>(&mut self, file: &mut F) -> Result<(), SourceError> {
        if let Err(e) = file.seek(SeekFrom::Start(self.offset)).await {
            debug!("Seek to {} failed on {}: {}", self.offset, self.path.display(), e);
            self.restart_from_top();
            file.seek(SeekFrom::Start(0)).await.map_err(|e| self.io_error(e))?;
        }
        Ok(())
    }

    /// Read whatever was appended since the last poll.
    ///
    /// Returns the number of lines appended to the buffer.
    pub async fn poll_once(&mut self) -> Result<usize, SourceError> {
        let mut file = File::open(&self.path).await.map_err(|e| self.io_error(e))?;
        let len = file.metadata().await.map_err(|e| self.io_error(e))?.len();

        if len < self.offset {
            info!("Log file {} shrank ({} < {}); reading from the start", self.path.display(), len, self.offset);
            self.restart_from_top();
        }
        if len == self.offset {
            return Ok(0);
        }

        self.seek_or_restart(&mut file).await?;

        let mut chunk = Vec::new();
        let read = (&mut file)
            .take(MAX_READ_PER_POLL)
            .read_to_end(&mut chunk)
            .await
            .map_err(|e| self.io_error(e))?;
        self.offset += read as u64;

        let appended = self.ingest.feed(&mut self.normalizer, &chunk);
        self.health.record_lines(appended);
        Ok(appended)
    }

    async fn wait_for_file(&self) {
        self.health.set_state(SourceState::WaitingForFile);
        while !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            time::sleep(self.wait_interval).await;
        }
    }

    async fn tail(&mut self) -> Result<(), SourceError> {
        self.wait_for_file().await;
        info!("Tailing log file {}", self.path.display());
        self.health.set_state(SourceState::Tailing);
        self.health.clear_failures();

        loop {
            self.poll_once().await?;
            time::sleep(self.poll_interval).await;
        }
    }
}

impl LogSource for FileTailPoller {
    fn health(&self) -> Arc<SourceHealth> {
        Arc::clone(&self.health)
    }

    fn run_cycle(&mut self) -> Pin<Box<dyn Future<Output = Result<(), SourceError>> + Send + '_>> {
        Box::pin(self.tail())
    }

    /// After an error the file is treated as new.
    fn reset(&mut self) {
        self.restart_from_top();
    }

    fn backoff(&self) -> Duration {
        self.wait_interval
    }

    fn backoff_state(&self) -> SourceState {
        SourceState::WaitingForFile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::RingBuffer;
    use crate::notify::testing::RecordingNotifier;
    use std::io::Write;
    use std::task::{Context, Poll};

    /// Seekable handle whose first `failures` seeks are refused.
    struct RefusingSeek {
        failures: u32,
        position: u64,
    }

    impl AsyncSeek for RefusingSeek {
        fn start_seek(mut self: Pin<&mut Self>, position: SeekFrom) -> std::io::Result<()> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(std::io::Error::new(ErrorKind::InvalidInput, "illegal seek"));
            }
            if let SeekFrom::Start(offset) = position {
                self.position = offset;
            }
            Ok(())
        }

        fn poll_complete(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<u64>> {
            Poll::Ready(Ok(self.position))
        }
    }

    fn poller(path: &Path) -> (FileTailPoller, Arc<RingBuffer>, Arc<RecordingNotifier>) {
        let buffer = Arc::new(RingBuffer::new(100));
        let recorder = Arc::new(RecordingNotifier::default());
        let ingest = Ingest::new(Arc::clone(&buffer), recorder.clone());
        let config = FileSourceConfig {
            path: Some(path.to_path_buf()),
            poll_interval_ms: 10,
            wait_interval_ms: 10,
        };
        (FileTailPoller::new(&config, ingest, 1024).unwrap(), buffer, recorder)
    }

    fn append(path: &Path, bytes: &[u8]) {
        let mut file = std::fs::OpenOptions::new().create(true).append(true).open(path).unwrap();
        file.write_all(bytes).unwrap();
    }

    #[test]
    fn test_no_path_means_no_poller() {
        let buffer = Arc::new(RingBuffer::new(10));
        let ingest = Ingest::new(buffer, Arc::new(RecordingNotifier::default()));
        assert!(FileTailPoller::new(&FileSourceConfig::default(), ingest, 1024).is_none());
    }

    // ── Tailing ─────────────────────────────────────────────────

    #[tokio::test]
    async fn test_reads_only_new_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.log");
        append(&path, b"Loading world\nSteve has joined.\n");
        let (mut poller, buffer, recorder) = poller(&path);

        assert_eq!(poller.poll_once().await.unwrap(), 2);
        assert_eq!(poller.poll_once().await.unwrap(), 0);

        append(&path, b"Steve has left.\nhalf");
        assert_eq!(poller.poll_once().await.unwrap(), 1);
        append(&path, b" line\n");
        assert_eq!(poller.poll_once().await.unwrap(), 1);

        assert_eq!(
            buffer.lines_since(0).lines,
            vec!["Loading world", "Steve has joined.", "Steve has left.", "half line"]
        );
        assert_eq!(recorder.seen.lock().len(), 2);
        assert_eq!(poller.offset(), std::fs::metadata(&path).unwrap().len());
    }

    #[tokio::test]
    async fn test_truncation_restarts_from_top() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.log");
        append(&path, b"a fairly long first session line\n");
        let (mut poller, buffer, _) = poller(&path);
        poller.poll_once().await.unwrap();

        std::fs::write(&path, b"new\n").unwrap();
        assert_eq!(poller.poll_once().await.unwrap(), 1);
        assert_eq!(buffer.lines_since(1).lines, vec!["new"]);
        assert_eq!(poller.offset(), 4);
    }

    // ── Seeking ─────────────────────────────────────────────────

    #[tokio::test]
    async fn test_failed_seek_restarts_from_top() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.log");
        append(&path, b"done\npartial");
        let (mut poller, buffer, _) = poller(&path);
        poller.poll_once().await.unwrap();
        assert_eq!(poller.offset(), 12);

        let mut handle = RefusingSeek { failures: 1, position: 99 };
        poller.seek_or_restart(&mut handle).await.unwrap();
        assert_eq!(poller.offset(), 0);
        assert_eq!(handle.position, 0);

        // The pending "partial" was dropped with the offset.
        poller.ingest.feed(&mut poller.normalizer, b"fresh\n");
        assert_eq!(buffer.lines_since(0).lines, vec!["done", "fresh"]);
    }

    #[tokio::test]
    async fn test_seek_refused_twice_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (mut poller, _, _) = poller(&dir.path().join("server.log"));
        let mut handle = RefusingSeek { failures: 2, position: 0 };
        assert!(matches!(
            poller.seek_or_restart(&mut handle).await,
            Err(SourceError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_seek_keeps_offset_when_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.log");
        append(&path, b"one\n");
        let (mut poller, _, _) = poller(&path);
        poller.poll_once().await.unwrap();

        let mut handle = RefusingSeek { failures: 0, position: 0 };
        poller.seek_or_restart(&mut handle).await.unwrap();
        assert_eq!(poller.offset(), 4);
        assert_eq!(handle.position, 4);
    }

    #[tokio::test]
    async fn test_missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.log");
        let (mut poller, _, _) = poller(&path);
        assert!(matches!(poller.poll_once().await, Err(SourceError::FileMissing(_))));
    }

    #[tokio::test]
    async fn test_cycle_waits_for_file_then_tails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.log");
        let (poller, buffer, _) = poller(&path);
        let health = poller.health();

        let task = tokio::spawn(crate::source::Supervisor::new(3).run(poller));
        time::sleep(Duration::from_millis(30)).await;
        assert_eq!(health.state(), SourceState::WaitingForFile);

        append(&path, b"World loaded\n");
        time::timeout(Duration::from_secs(5), async {
            while buffer.is_empty() {
                time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
        task.abort();

        assert_eq!(health.state(), SourceState::Tailing);
        assert_eq!(buffer.lines_since(0).lines, vec!["World loaded"]);
    }
}
