//! Model — configuration structs and defaults.
//!
//! Each component gets its own typed section; nothing reads settings by name.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::console::DEFAULT_CAPACITY;
use crate::parser::normalize::DEFAULT_MAX_PENDING_BYTES;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub bind_address: String,
    pub console: ConsoleConfig,
    pub container: ContainerSourceConfig,
    pub file: FileSourceConfig,
    pub supervisor: SupervisorConfig,
    pub notify: NotifyConfig,
    pub command: CommandConfig,
}

/// Console buffer sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Resident lines kept for cursor reads.
    pub capacity: usize,
    /// Unterminated bytes a poller may hold before flushing them as a line.
    pub max_pending_bytes: usize,
}

/// Container log source (Docker mode).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSourceConfig {
    pub enabled: bool,
    /// Container name or ID to follow.
    pub container: String,
    /// Docker socket; empty means the platform default.
    pub docker_socket: String,
    /// Lines of history requested on the first connection.
    pub tail_lines: u32,
    pub backoff_secs: u64,
}

/// File tail source. No path means the poller is not started.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSourceConfig {
    pub path: Option<PathBuf>,
    pub poll_interval_ms: u64,
    pub wait_interval_ms: u64,
}

/// Restart policy shared by all pollers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Consecutive failures after which a poller logs at error level.
    pub failure_log_threshold: u32,
}

/// Which player events are forwarded to the notification sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub join: bool,
    pub leave: bool,
    /// Bounded queue between pollers and the sink; overflow is dropped.
    pub queue_size: usize,
}

/// How console commands reach the server process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum CommandConfig {
    #[default]
    Disabled,
    /// Write to the server's stdin FIFO.
    Fifo { path: PathBuf },
    /// Inject keystrokes into a `screen` session.
    Screen { session: String },
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            console: ConsoleConfig::default(),
            container: ContainerSourceConfig::default(),
            file: FileSourceConfig::default(),
            supervisor: SupervisorConfig::default(),
            notify: NotifyConfig::default(),
            command: CommandConfig::default(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_pending_bytes: DEFAULT_MAX_PENDING_BYTES,
        }
    }
}

impl Default for ContainerSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            container: "terraria".to_string(),
            docker_socket: String::new(),
            tail_lines: 200,
            backoff_secs: 5,
        }
    }
}

impl Default for FileSourceConfig {
    fn default() -> Self {
        Self {
            path: None,
            poll_interval_ms: 500,
            wait_interval_ms: 2000,
        }
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self { failure_log_threshold: 3 }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            join: true,
            leave: true,
            queue_size: 64,
        }
    }
}

impl PanelConfig {
    /// Check that values are sane. No I/O.
    pub fn validate(&self) -> Result<(), String> {
        if self.bind_address.is_empty() {
            return Err("bind_address must not be empty".to_string());
        }
        if self.console.capacity == 0 {
            return Err("console.capacity must be > 0".to_string());
        }
        if self.console.max_pending_bytes == 0 {
            return Err("console.max_pending_bytes must be > 0".to_string());
        }
        if self.container.enabled {
            if self.container.container.is_empty() {
                return Err("container.container must be set when the container source is enabled".to_string());
            }
            if self.container.backoff_secs == 0 {
                return Err("container.backoff_secs must be > 0".to_string());
            }
        }
        if self.file.poll_interval_ms == 0 || self.file.wait_interval_ms == 0 {
            return Err("file.poll_interval_ms and file.wait_interval_ms must be > 0".to_string());
        }
        if self.notify.queue_size == 0 {
            return Err("notify.queue_size must be > 0".to_string());
        }
        match &self.command {
            CommandConfig::Fifo { path } if path.as_os_str().is_empty() => {
                Err("command.path must not be empty in fifo mode".to_string())
            }
            CommandConfig::Screen { session } if session.is_empty() => {
                Err("command.session must not be empty in screen mode".to_string())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Validation ──────────────────────────────────────────────

    #[test]
    fn test_defaults_are_valid() {
        assert!(PanelConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_bind_address() {
        let config = PanelConfig { bind_address: String::new(), ..PanelConfig::default() };
        assert!(config.validate().unwrap_err().contains("bind_address"));
    }

    #[test]
    fn test_validate_zero_capacity() {
        let mut config = PanelConfig::default();
        config.console.capacity = 0;
        assert!(config.validate().unwrap_err().contains("console.capacity"));
    }

    #[test]
    fn test_validate_zero_backoff_only_when_enabled() {
        let mut config = PanelConfig::default();
        config.container.backoff_secs = 0;
        assert!(config.validate().unwrap_err().contains("backoff_secs"));

        config.container.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_screen_session() {
        let config = PanelConfig {
            command: CommandConfig::Screen { session: String::new() },
            ..PanelConfig::default()
        };
        assert!(config.validate().unwrap_err().contains("session"));
    }

    // ── Defaults ────────────────────────────────────────────────

    #[test]
    fn test_default_values() {
        let config = PanelConfig::default();
        assert_eq!(config.console.capacity, 500);
        assert_eq!(config.container.backoff_secs, 5);
        assert_eq!(config.file.poll_interval_ms, 500);
        assert_eq!(config.file.wait_interval_ms, 2000);
        assert!(config.file.path.is_none());
        assert_eq!(config.command, CommandConfig::Disabled);
    }

    // ── TOML shape ──────────────────────────────────────────────

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: PanelConfig = toml::from_str(
            r#"
            bind_address = "127.0.0.1:8080"

            [console]
            capacity = 50

            [file]
            path = "/srv/terraria/server.log"

            [command]
            mode = "screen"
            session = "terraria"
            "#,
        )
        .unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.console.capacity, 50);
        assert_eq!(config.console.max_pending_bytes, DEFAULT_MAX_PENDING_BYTES);
        assert_eq!(config.file.path, Some(PathBuf::from("/srv/terraria/server.log")));
        assert_eq!(config.file.poll_interval_ms, 500);
        assert_eq!(config.command, CommandConfig::Screen { session: "terraria".to_string() });
        assert!(config.container.enabled);
    }

    #[test]
    fn test_fifo_command_toml() {
        let config: PanelConfig = toml::from_str(
            r#"
            [command]
            mode = "fifo"
            path = "/run/terraria.stdin"
            "#,
        )
        .unwrap();
        assert_eq!(config.command, CommandConfig::Fifo { path: PathBuf::from("/run/terraria.stdin") });
    }
}
