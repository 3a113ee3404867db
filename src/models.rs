//! Data model shared with the Process Guard supervisor.
//!
//! Serde field names are the wire names and must stay stable: the supervisor
//! deserializes `config` payloads into the same shapes.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Well-known name of the supervisor's service registration.
pub const SERVICE_NAME: &str = "procguard";

/// File name of the supervisor's Unix socket endpoint.
pub const SOCKET_FILE_NAME: &str = "procguard.sock";

/// Heartbeat timeout applied when an item does not specify one.
pub const DEFAULT_HEARTBEAT_TIMEOUT_MS: u64 = 1000;

/// A registration describing one executable the supervisor should run and
/// watch, keyed by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorItem {
    pub id: String,
    pub exe_path: String,
    /// Omitted on the wire when empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
    pub name: String,
    #[serde(default)]
    pub minimize: bool,
    #[serde(default)]
    pub no_window: bool,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_heartbeat_timeout")]
    pub heartbeat_timeout_ms: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_heartbeat_timeout() -> u64 {
    DEFAULT_HEARTBEAT_TIMEOUT_MS
}

impl MonitorItem {
    /// Create an item for `exe_path`, generating an `item-<epoch-ms>` id when
    /// none is given.
    pub fn create(
        exe_path: impl Into<String>,
        name: impl Into<String>,
        id: Option<String>,
    ) -> Self {
        Self {
            id: id.unwrap_or_else(|| format!("item-{}", Utc::now().timestamp_millis())),
            exe_path: exe_path.into(),
            args: None,
            name: name.into(),
            minimize: false,
            no_window: false,
            enabled: true,
            heartbeat_timeout_ms: DEFAULT_HEARTBEAT_TIMEOUT_MS,
        }
    }

    /// Set the command-line arguments.
    pub fn with_args(mut self, args: impl Into<String>) -> Self {
        let args = args.into();
        self.args = if args.is_empty() { None } else { Some(args) };
        self
    }

    /// Set the heartbeat timeout.
    pub fn with_heartbeat_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.heartbeat_timeout_ms = timeout_ms;
        self
    }
}

/// Supervisor-reported snapshot for one monitored item. Immutable value,
/// replaced wholesale on each status query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessStatus {
    pub id: String,
    pub name: String,
    pub exe_path: String,
    #[serde(default)]
    pub enabled: bool,
    /// None when the process is not running.
    #[serde(default)]
    pub process_id: Option<u32>,
    /// Epoch milliseconds of the last accepted heartbeat.
    #[serde(default)]
    pub last_heartbeat_ms: i64,
    #[serde(default = "default_heartbeat_timeout")]
    pub heartbeat_timeout_ms: u64,
    #[serde(default)]
    pub restart_count: u32,
    #[serde(default)]
    pub is_alive: bool,
    #[serde(default)]
    pub is_heartbeat_ok: bool,
}

/// Aggregate status reported by the supervisor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    #[serde(default)]
    pub service_running: bool,
    #[serde(default)]
    pub total_items: usize,
    #[serde(default)]
    pub items: Vec<ProcessStatus>,
}

/// Current epoch time in milliseconds, the timestamp unit used on the wire.
pub fn epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}
