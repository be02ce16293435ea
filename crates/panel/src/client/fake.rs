//! Fake — test double for the container collaborator.
//!
//! Provides a deterministic [`FakeDocker`] that implements [`ContainerLogs`]
//! using in-memory state. Each call to `follow_logs` consumes the next
//! scripted session, so reconnect behaviour can be driven step by step.

use std::collections::{HashMap, VecDeque};
use std::pin::Pin;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::client::docker::{ChunkStream, ContainerLogs};
use crate::docker::{ContainerState, DockerError, LogFollowRequest};

/// One item of a scripted log session.
#[derive(Clone, Debug)]
pub enum FakeChunk {
    Data(Bytes),
    /// The stream fails with `ConnectionFailed(message)` at this point.
    Fail(String),
}

impl FakeChunk {
    pub fn data(bytes: &[u8]) -> Self {
        FakeChunk::Data(Bytes::copy_from_slice(bytes))
    }
}

#[derive(Default)]
struct Inner {
    containers: HashMap<String, ContainerState>,
    sessions: VecDeque<Vec<FakeChunk>>,
    requests: Vec<LogFollowRequest>,
}

/// A fake Docker daemon for deterministic testing.
pub struct FakeDocker {
    inner: Mutex<Inner>,
}

impl FakeDocker {
    /// Create an empty fake with no containers and no sessions.
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner::default()) }
    }

    /// Seed a container.
    pub async fn add_container(&self, name: &str, running: bool) {
        let state = ContainerState {
            running,
            status: if running { "running" } else { "exited" }.to_string(),
        };
        self.inner.lock().await.containers.insert(name.to_string(), state);
    }

    /// Queue the chunks the next `follow_logs` call will yield.
    pub async fn add_session(&self, chunks: Vec<FakeChunk>) {
        self.inner.lock().await.sessions.push_back(chunks);
    }

    /// Every `follow_logs` request received so far.
    pub async fn requests(&self) -> Vec<LogFollowRequest> {
        self.inner.lock().await.requests.clone()
    }
}

impl Default for FakeDocker {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerLogs for FakeDocker {
    fn container_state<'a>(
        &'a self,
        container: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<ContainerState, DockerError>> + Send + 'a>> {
        Box::pin(async move {
            self.inner
                .lock()
                .await
                .containers
                .get(container)
                .cloned()
                .ok_or_else(|| DockerError::ContainerNotFound(container.to_string()))
        })
    }

    fn follow_logs(
        &self,
        request: LogFollowRequest,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<ChunkStream, DockerError>> + Send + '_>> {
        Box::pin(async move {
            let mut state = self.inner.lock().await;
            if !state.containers.contains_key(&request.container) {
                return Err(DockerError::ContainerNotFound(request.container));
            }
            state.requests.push(request);

            let chunks = state
                .sessions
                .pop_front()
                .ok_or_else(|| DockerError::ConnectionFailed("no scripted session".to_string()))?;

            let items: Vec<Result<Bytes, DockerError>> = chunks
                .into_iter()
                .map(|chunk| match chunk {
                    FakeChunk::Data(bytes) => Ok(bytes),
                    FakeChunk::Fail(message) => Err(DockerError::ConnectionFailed(message)),
                })
                .collect();

            Ok(Box::pin(tokio_stream::iter(items)) as ChunkStream)
        })
    }
}
