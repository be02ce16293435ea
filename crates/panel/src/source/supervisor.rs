use tokio::time;
use tracing::{error, info, warn};

use super::LogSource;

/// Restarts a [`LogSource`] forever, backing off between cycles.
///
/// Failures are logged at warn level until `failure_log_threshold`
/// consecutive failures, then at error level.
#[derive(Debug, Clone, Copy)]
pub struct Supervisor {
    failure_log_threshold: u64,
}

impl Supervisor {
    pub fn new(failure_log_threshold: u32) -> Self {
        Self { failure_log_threshold: u64::from(failure_log_threshold.max(1)) }
    }

    pub async fn run<S: LogSource>(self, mut source: S) {
        let health = source.health();
        info!("Starting {} log source (backoff: {:?})", health.name(), source.backoff());

        loop {
            let outcome = source.run_cycle().await;
            source.reset();

            match outcome {
                Ok(()) => {
                    info!("{} log source ended; reconnecting", health.name());
                }
                Err(e) => {
                    let failures = health.record_failure();
                    if failures >= self.failure_log_threshold {
                        error!("{} log source failed {} times in a row: {}", health.name(), failures, e);
                    } else {
                        warn!("{} log source failed (attempt {}): {}", health.name(), failures, e);
                    }
                }
            }

            health.set_state(source.backoff_state());
            time::sleep(source.backoff()).await;
        }
    }
}
