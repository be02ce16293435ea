//! Load — config loading from file and environment variables.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::model::{CommandConfig, PanelConfig};

const DEFAULT_CONFIG_PATH: &str = "/etc/panel/panel.toml";

impl PanelConfig {
    /// Load configuration from file or environment variables
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = std::env::var("PANEL_CONFIG_FILE")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&config_path).exists() {
            tracing::info!("Loading configuration from: {}", config_path);
            Self::from_file(&config_path)?
        } else {
            tracing::info!("Config file not found at {}, using environment variables", config_path);
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: PanelConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Overlay environment settings on top of whatever was loaded.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    /// Values that fail to parse are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let parsed = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());

        if let Some(bind) = lookup("PANEL_BIND_ADDRESS") {
            self.bind_address = bind;
        }
        if let Some(capacity) = parsed("PANEL_CONSOLE_LINES") {
            self.console.capacity = capacity as usize;
        }

        if let Some(container) = lookup("SERVER_CONTAINER") {
            self.container.container = container;
        }
        if let Some(socket) = lookup("DOCKER_SOCKET") {
            self.container.docker_socket = socket;
        }
        if let Some(enabled) = lookup("PANEL_CONTAINER_LOGS").and_then(|s| s.parse::<bool>().ok()) {
            self.container.enabled = enabled;
        }
        if let Some(secs) = parsed("PANEL_CONTAINER_BACKOFF_SECS") {
            self.container.backoff_secs = secs;
        }

        if let Some(path) = lookup("LOG_FILE") {
            self.file.path = if path.trim().is_empty() { None } else { Some(PathBuf::from(path)) };
        }
        if let Some(ms) = parsed("PANEL_FILE_POLL_MS") {
            self.file.poll_interval_ms = ms;
        }

        if let Some(path) = lookup("SERVER_STDIN_FIFO") {
            self.command = CommandConfig::Fifo { path: PathBuf::from(path) };
        } else if let Some(session) = lookup("SCREEN_SESSION") {
            self.command = CommandConfig::Screen { session };
        }
    }
}
