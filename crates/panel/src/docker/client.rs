//! Docker client — core struct, constructor, error types.
//!
//! Container queries and log following live in `container.rs`, which adds an
//! `impl DockerClient` block.

use bollard::Docker;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DockerError {
    #[error("Docker connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Container not found: {0}")]
    ContainerNotFound(String),
    #[error("Stream closed")]
    StreamClosed,
    #[error("Bollard error: {0}")]
    BollardError(#[from] bollard::errors::Error),
}

impl DockerError {
    /// Map a bollard error for `container`, turning a 404 into `ContainerNotFound`.
    pub(crate) fn for_container(container: &str, err: bollard::errors::Error) -> Self {
        match err {
            bollard::errors::Error::DockerResponseServerError { status_code: 404, .. } => {
                DockerError::ContainerNotFound(container.to_string())
            }
            other => DockerError::BollardError(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DockerClient {
    pub(super) client: Docker,
}

impl DockerClient {
    /// Prepare a client for `socket_path` (empty for the platform default).
    ///
    /// Bollard connects lazily, so this succeeds even while the daemon is
    /// down; failures surface on the first request.
    pub fn new(socket_path: &str) -> Result<Self, DockerError> {
        let connection = if socket_path.is_empty() {
            Docker::connect_with_defaults()
                .map_err(|e| DockerError::ConnectionFailed(e.to_string()))?
        } else {
            let clean_path = socket_path.trim_start_matches("unix://");
            Docker::connect_with_socket(clean_path, 120, &bollard::API_DEFAULT_VERSION)
                .map_err(|e| DockerError::ConnectionFailed(e.to_string()))?
        };

        Ok(DockerClient { client: connection })
    }
}
