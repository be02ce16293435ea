//! Container log poller — follows the game server container's output.
//!
//! Each cycle checks that the container is running, then follows stdout and
//! stderr until the stream ends. The first connection replays `tail_lines` of
//! history; later connections resume from the last disconnect time so a
//! reconnect does not replay the tail again.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_stream::StreamExt;
use tracing::{debug, info};

use super::{Ingest, LogSource, SourceError, SourceHealth, SourceState};
use crate::client::ContainerLogs;
use crate::conf::ContainerSourceConfig;
use crate::docker::LogFollowRequest;
use crate::parser::LineNormalizer;

pub struct ContainerLogPoller {
    docker: Arc<dyn ContainerLogs>,
    container: String,
    tail_lines: u32,
    backoff: Duration,
    ingest: Ingest,
    normalizer: LineNormalizer,
    health: Arc<SourceHealth>,
    resume_from: Option<i64>,
}

impl ContainerLogPoller {
    pub fn new(
        docker: Arc<dyn ContainerLogs>,
        config: &ContainerSourceConfig,
        ingest: Ingest,
        max_pending_bytes: usize,
    ) -> Self {
        Self {
            docker,
            container: config.container.clone(),
            tail_lines: config.tail_lines,
            backoff: Duration::from_secs(config.backoff_secs),
            ingest,
            normalizer: LineNormalizer::new(max_pending_bytes),
            health: Arc::new(SourceHealth::new("container", SourceState::Connecting)),
            resume_from: None,
        }
    }

    fn next_request(&self) -> LogFollowRequest {
        match self.resume_from {
            Some(since) => LogFollowRequest {
                container: self.container.clone(),
                tail_lines: None,
                since: Some(since),
            },
            None => LogFollowRequest {
                container: self.container.clone(),
                tail_lines: Some(self.tail_lines),
                since: None,
            },
        }
    }

    async fn follow_once(&mut self) -> Result<(), SourceError> {
        self.health.set_state(SourceState::Connecting);

        let state = self.docker.container_state(&self.container).await?;
        if !state.running {
            return Err(SourceError::NotRunning(self.container.clone(), state.status));
        }

        let request = self.next_request();
        debug!(container = %self.container, since = ?request.since, tail = ?request.tail_lines, "Following container logs");
        let mut stream = self.docker.follow_logs(request).await?;

        self.health.set_state(SourceState::Streaming);
        self.health.clear_failures();
        info!("Streaming logs from container {}", self.container);

        let result = loop {
            match stream.next().await {
                Some(Ok(chunk)) => {
                    let appended = self.ingest.feed(&mut self.normalizer, &chunk);
                    self.health.record_lines(appended);
                }
                Some(Err(e)) => break Err(SourceError::from(e)),
                None => break Ok(()),
            }
        };

        self.resume_from = Some(Utc::now().timestamp());
        result
    }
}

impl LogSource for ContainerLogPoller {
    fn health(&self) -> Arc<SourceHealth> {
        Arc::clone(&self.health)
    }

    fn run_cycle(&mut self) -> Pin<Box<dyn Future<Output = Result<(), SourceError>> + Send + '_>> {
        Box::pin(self.follow_once())
    }

    /// A partial line from a dead connection never joins the next one.
    fn reset(&mut self) {
        self.normalizer.reset();
    }

    fn backoff(&self) -> Duration {
        self.backoff
    }
}
