use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use tracing::warn;

use super::{CommandSender, SEND_TIMEOUT};

/// Writes commands to the server's stdin FIFO, one per line.
///
/// The FIFO is opened non-blocking for every command: with no server
/// holding the read end, the open fails at once instead of hanging.
pub struct FifoSender {
    path: PathBuf,
}

impl FifoSender {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[cfg(unix)]
    async fn write_line(&self, command: &str) -> std::io::Result<()> {
        use tokio::io::AsyncWriteExt;
        use tokio::net::unix::pipe;

        let mut sender = pipe::OpenOptions::new().open_sender(&self.path)?;
        let line = format!("{}\n", command);
        match tokio::time::timeout(SEND_TIMEOUT, sender.write_all(line.as_bytes())).await {
            Ok(result) => result,
            Err(_) => Err(std::io::Error::new(std::io::ErrorKind::TimedOut, "fifo write timed out")),
        }
    }

    #[cfg(not(unix))]
    async fn write_line(&self, _command: &str) -> std::io::Result<()> {
        let _ = SEND_TIMEOUT;
        Err(std::io::Error::new(std::io::ErrorKind::Unsupported, "fifo mode needs a unix host"))
    }
}

impl CommandSender for FifoSender {
    fn send<'a>(&'a self, command: &'a str) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async move {
            match self.write_line(command).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Cannot write to {}: {}", self.path.display(), e);
                    false
                }
            }
        })
    }

    fn mode(&self) -> &'static str {
        "fifo"
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::unix::pipe;

    fn mkfifo(path: &std::path::Path) -> bool {
        std::process::Command::new("mkfifo")
            .arg(path)
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    #[tokio::test]
    async fn test_missing_fifo_fails() {
        let dir = tempfile::tempdir().unwrap();
        let sender = FifoSender::new(dir.path().join("absent"));
        assert!(!sender.send("save").await);
    }

    #[tokio::test]
    async fn test_no_reader_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stdin");
        if !mkfifo(&path) {
            return;
        }
        let sender = FifoSender::new(path);
        assert!(!sender.send("save").await);
    }

    #[tokio::test]
    async fn test_delivers_newline_terminated_command() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stdin");
        if !mkfifo(&path) {
            return;
        }
        let mut receiver = pipe::OpenOptions::new().open_receiver(&path).unwrap();

        let sender = FifoSender::new(path);
        assert!(sender.send("say hello").await);

        let mut received = vec![0u8; 64];
        let n = receiver.read(&mut received).await.unwrap();
        assert_eq!(&received[..n], b"say hello\n");
    }
}
