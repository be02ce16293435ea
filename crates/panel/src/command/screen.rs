use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tokio::time;
use tracing::warn;

use super::{CommandSender, SEND_TIMEOUT};

/// Types commands into a detached `screen` session.
pub struct ScreenSender {
    session: String,
}

impl ScreenSender {
    pub fn new(session: String) -> Self {
        Self { session }
    }

    /// Arguments for `screen`; the trailing `\r` presses Enter.
    fn args(&self, command: &str) -> Vec<String> {
        vec![
            "-S".to_string(),
            self.session.clone(),
            "-X".to_string(),
            "stuff".to_string(),
            format!("{}\r", command),
        ]
    }

    async fn stuff(&self, command: &str) -> bool {
        let mut cmd = Command::new("screen");
        cmd.args(self.args(command))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        match time::timeout(SEND_TIMEOUT, cmd.status()).await {
            Ok(Ok(status)) if status.success() => true,
            Ok(Ok(status)) => {
                warn!("screen -S {} exited with {}", self.session, status);
                false
            }
            Ok(Err(e)) => {
                warn!("Failed to run screen: {}", e);
                false
            }
            Err(_) => {
                warn!("screen -S {} timed out after {:?}", self.session, SEND_TIMEOUT);
                false
            }
        }
    }
}

impl CommandSender for ScreenSender {
    fn send<'a>(&'a self, command: &'a str) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(self.stuff(command))
    }

    fn mode(&self) -> &'static str {
        "screen"
    }
}
