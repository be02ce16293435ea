//! Live — implements `ContainerLogs` for the real Bollard-backed `DockerClient`.

use std::pin::Pin;

use crate::client::docker::{ChunkStream, ContainerLogs};
use crate::docker::{ContainerState, DockerClient, DockerError, LogFollowRequest};

impl ContainerLogs for DockerClient {
    fn container_state<'a>(
        &'a self,
        container: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<ContainerState, DockerError>> + Send + 'a>> {
        Box::pin(DockerClient::container_state(self, container))
    }

    fn follow_logs(
        &self,
        request: LogFollowRequest,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<ChunkStream, DockerError>> + Send + '_>> {
        Box::pin(async move {
            let stream = DockerClient::follow_logs(self, &request);
            Ok(Box::pin(stream) as ChunkStream)
        })
    }
}
