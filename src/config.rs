//! Client-side configuration: where the supervisor socket lives, which unit
//! name the service controller manages, and the channel timeouts.
//!
//! Resolution order: built-in defaults, then the optional config file at
//! `<config-dir>/procguard/client.toml`, then the `PROCGUARD_SOCKET`
//! environment variable.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::{SERVICE_NAME, SOCKET_FILE_NAME};

/// Default bound for opening the channel.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default bound for a single write or read on an open channel.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Path of the supervisor's Unix socket endpoint.
    pub socket_path: PathBuf,
    /// Bound for `connect`, including busy-endpoint retries.
    pub connect_timeout: Duration,
    /// Bound for each blocking write/read on the channel.
    pub io_timeout: Duration,
    /// systemd unit name (without the `.service` suffix).
    pub service_name: String,
    /// Directory the service controller installs unit files into.
    pub unit_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            io_timeout: DEFAULT_IO_TIMEOUT,
            service_name: SERVICE_NAME.to_string(),
            unit_dir: PathBuf::from("/etc/systemd/system"),
        }
    }
}

/// Optional overrides read from `client.toml`.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    socket_path: Option<PathBuf>,
    connect_timeout_ms: Option<u64>,
    io_timeout_ms: Option<u64>,
    service_name: Option<String>,
    unit_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Load configuration from the default file location and environment.
    pub fn load() -> Result<Self> {
        let mut config = match config_file_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };

        if let Ok(socket) = std::env::var("PROCGUARD_SOCKET") {
            if !socket.is_empty() {
                config.socket_path = PathBuf::from(socket);
            }
        }
        Ok(config)
    }

    /// Load configuration from a specific TOML file, filling gaps with
    /// defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let file: FileConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        let mut config = Self::default();
        if let Some(socket_path) = file.socket_path {
            config.socket_path = socket_path;
        }
        if let Some(ms) = file.connect_timeout_ms {
            config.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = file.io_timeout_ms {
            config.io_timeout = Duration::from_millis(ms);
        }
        if let Some(service_name) = file.service_name {
            config.service_name = service_name;
        }
        if let Some(unit_dir) = file.unit_dir {
            config.unit_dir = unit_dir;
        }
        Ok(config)
    }

    /// Replace the socket path.
    pub fn with_socket_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.socket_path = path.into();
        self
    }

    /// Replace the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// Default socket location when neither file nor environment override it.
fn default_socket_path() -> PathBuf {
    PathBuf::from("/run").join(SOCKET_FILE_NAME)
}

/// Location of the optional client config file.
fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("procguard").join("client.toml"))
}
