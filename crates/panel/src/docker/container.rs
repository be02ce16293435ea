//! Container domain — state inspection and log following.

use super::client::{DockerClient, DockerError};

use bollard::container::LogOutput;
use bollard::query_parameters::LogsOptions;
use bytes::Bytes;
use futures_util::stream::{Stream, StreamExt};
use serde::Serialize;

/// The slice of `docker inspect` the console cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerState {
    pub running: bool,
    /// "running", "exited", "restarting", …
    pub status: String,
}

/// Parameters for following a container's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFollowRequest {
    pub container: String,
    /// History lines to replay first; `None` means everything `since` allows.
    pub tail_lines: Option<u32>,
    /// Only output produced at or after this Unix timestamp (seconds).
    pub since: Option<i64>,
}

/// Build the Docker logs query for `request`.
///
/// Both stdout and stderr are always requested: a server that writes only to
/// one of them otherwise shows up as silent.
pub(crate) fn logs_options(request: &LogFollowRequest) -> LogsOptions {
    // NOTE: Bollard v0.20 takes i32 Unix seconds for since/until.
    let since = request
        .since
        .unwrap_or(0)
        .clamp(0, i32::MAX as i64) as i32;

    LogsOptions {
        follow: true,
        stdout: true,
        stderr: true,
        since,
        until: 0,
        timestamps: false,
        tail: request
            .tail_lines
            .map(|n| n.to_string())
            .unwrap_or_else(|| "all".to_string()),
    }
}

impl DockerClient {
    pub async fn container_state(&self, container: &str) -> Result<ContainerState, DockerError> {
        let details = self
            .client
            .inspect_container(container, None)
            .await
            .map_err(|e| DockerError::for_container(container, e))?;

        let state = details.state.as_ref();
        Ok(ContainerState {
            running: state.and_then(|s| s.running).unwrap_or(false),
            status: state
                .and_then(|s| s.status.as_ref())
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    /// Follow raw output chunks. With a TTY container these are arbitrary
    /// byte runs, not lines.
    pub fn follow_logs(
        &self,
        request: &LogFollowRequest,
    ) -> impl Stream<Item = Result<Bytes, DockerError>> + Send + 'static {
        let container = request.container.clone();
        self.client
            .logs(&request.container, Some(logs_options(request)))
            .map(move |result| match result {
                Ok(output) => Ok(output_bytes(output)),
                Err(e) => Err(DockerError::for_container(&container, e)),
            })
    }
}

fn output_bytes(output: LogOutput) -> Bytes {
    match output {
        LogOutput::StdOut { message }
        | LogOutput::StdErr { message }
        | LogOutput::StdIn { message }
        | LogOutput::Console { message } => message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(tail: Option<u32>, since: Option<i64>) -> LogFollowRequest {
        LogFollowRequest { container: "terraria".to_string(), tail_lines: tail, since }
    }

    #[test]
    fn test_both_streams_requested() {
        let options = logs_options(&request(Some(200), None));
        assert!(options.stdout);
        assert!(options.stderr);
        assert!(options.follow);
        assert_eq!(options.tail, "200");
        assert_eq!(options.since, 0);
    }

    #[test]
    fn test_resume_replays_everything_since_disconnect() {
        let options = logs_options(&request(None, Some(1_700_000_000)));
        // "0" would make the daemon skip history and drop the backoff window.
        assert_eq!(options.tail, "all");
        assert_eq!(options.since, 1_700_000_000);
    }

    #[test]
    fn test_since_clamped_to_i32() {
        let options = logs_options(&request(None, Some(i64::MAX)));
        assert_eq!(options.since, i32::MAX);
        let options = logs_options(&request(None, Some(-5)));
        assert_eq!(options.since, 0);
    }

    #[test]
    fn test_output_bytes_keeps_stderr() {
        let bytes = output_bytes(LogOutput::StdErr { message: Bytes::from_static(b"boom\n") });
        assert_eq!(bytes.as_ref(), b"boom\n");
    }
}
