//! Boot — logging init, config load, poller startup, state creation.

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::client::ContainerLogs;
use crate::command;
use crate::conf::PanelConfig;
use crate::console::RingBuffer;
use crate::docker::DockerClient;
use crate::notify::{log_notifications, ChannelNotifier, FilteredNotifier, Notifier};
use crate::source::{ContainerLogPoller, FileTailPoller, Ingest, LogSource, SourceHealth, Supervisor};
use crate::state::{PanelState, SharedState};

/// Initialise the tracing / logging subsystem.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "panel=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Load and validate config, start the log pollers and build shared state.
///
/// A Docker daemon that cannot be reached does not stop the panel: the
/// container source is skipped and the file source still runs.
pub async fn boot() -> Result<SharedState, Box<dyn std::error::Error>> {
    info!("Starting server panel v{}", env!("CARGO_PKG_VERSION"));

    let config = PanelConfig::load()?;
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;
    info!("Loaded configuration: bind_address={}", config.bind_address);

    let buffer = Arc::new(RingBuffer::new(config.console.capacity));
    info!("Console buffer holds {} lines", buffer.capacity());

    let (channel, rx) = ChannelNotifier::new(config.notify.queue_size);
    tokio::spawn(log_notifications(rx));
    let notifier: Arc<dyn Notifier> = Arc::new(FilteredNotifier::new(channel, config.notify.clone()));
    let ingest = Ingest::new(Arc::clone(&buffer), notifier);

    let supervisor = Supervisor::new(config.supervisor.failure_log_threshold);
    let mut sources: Vec<Arc<SourceHealth>> = Vec::new();

    if config.container.enabled {
        info!(
            "Following container {} via {}",
            config.container.container,
            if config.container.docker_socket.is_empty() {
                "default socket"
            } else {
                &config.container.docker_socket
            }
        );
        match DockerClient::new(&config.container.docker_socket) {
            Ok(client) => {
                let docker: Arc<dyn ContainerLogs> = Arc::new(client);
                let poller = ContainerLogPoller::new(
                    docker,
                    &config.container,
                    ingest.clone(),
                    config.console.max_pending_bytes,
                );
                sources.push(poller.health());
                tokio::spawn(supervisor.run(poller));
            }
            Err(e) => warn!("Container log source disabled: {}", e),
        }
    }

    match FileTailPoller::new(&config.file, ingest, config.console.max_pending_bytes) {
        Some(poller) => {
            info!("Tailing log file {}", poller.path().display());
            sources.push(poller.health());
            tokio::spawn(supervisor.run(poller));
        }
        None => info!("No log file configured; file tailing disabled"),
    }

    let commands = command::from_config(&config.command);
    info!("Console commands: {}", commands.mode());

    Ok(Arc::new(PanelState::new(config, buffer, commands, sources)))
}
