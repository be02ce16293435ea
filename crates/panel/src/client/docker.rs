//! Container trait — the abstract interface pollers use to reach Docker.
//!
//! `live.rs` provides the real Bollard-backed implementation.
//! `fake.rs` provides a test double.

use std::pin::Pin;

use bytes::Bytes;
use tokio_stream::Stream;

use crate::docker::{ContainerState, DockerError, LogFollowRequest};

/// Raw output chunks from a followed container.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, DockerError>> + Send>>;

/// Container-status and container-log primitives.
///
/// Object-safe thanks to `Pin<Box<…>>` returns.
/// Implementations must be `Send + Sync` so they can be shared behind `Arc`.
pub trait ContainerLogs: Send + Sync {
    fn container_state<'a>(
        &'a self,
        container: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<ContainerState, DockerError>> + Send + 'a>>;

    fn follow_logs(
        &self,
        request: LogFollowRequest,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<ChunkStream, DockerError>> + Send + '_>>;
}
