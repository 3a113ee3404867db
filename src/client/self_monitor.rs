//! Self-monitoring convenience: register the client's own process as a
//! monitor item and heartbeat on its behalf.

use std::path::PathBuf;
use std::time::Duration;

use super::Client;
use crate::error::{Error, Result};
use crate::models::{epoch_millis, MonitorItem};

/// Display name used when one cannot be derived from the executable path.
pub const DEFAULT_SELF_MONITOR_NAME: &str = "SelfMonitoredProcess";

/// Heartbeat timeout applied to self-monitor items when none is given.
/// Generous by default: the self heartbeat usually runs much faster.
pub const DEFAULT_SELF_HEARTBEAT_TIMEOUT_MS: u64 = 86_400_000;

impl Client {
    /// Register the current process as a monitor item.
    ///
    /// When `id` is `None` a `self-<epoch-ms>` id is generated. The display
    /// name is the executable's base file name without extension, falling
    /// back to [`DEFAULT_SELF_MONITOR_NAME`]. The id is recorded as the
    /// self-monitor id only when the registration succeeds; on success it is
    /// returned.
    pub fn add_self_monitor(
        &self,
        id: Option<String>,
        heartbeat_timeout_ms: Option<u64>,
    ) -> Result<String> {
        let item_id = id.unwrap_or_else(|| format!("self-{}", epoch_millis()));

        let exe_path = current_exe_path()
            .ok_or_else(|| Error::Application("failed to resolve current executable path".to_string()))?;
        let exe_path = exe_path.to_string_lossy().into_owned();

        let item = MonitorItem {
            id: item_id.clone(),
            exe_path: exe_path.clone(),
            args: None,
            name: derive_display_name(&exe_path),
            minimize: false,
            no_window: false,
            enabled: true,
            heartbeat_timeout_ms: heartbeat_timeout_ms
                .unwrap_or(DEFAULT_SELF_HEARTBEAT_TIMEOUT_MS),
        };

        self.add_monitor_item(&item)?;
        self.inner.set_self_monitor_id(Some(item_id.clone()));
        Ok(item_id)
    }

    /// Remove the registered self-monitor item.
    pub fn remove_self_monitor(&self) -> Result<()> {
        let id = self.require_self_monitor_id()?;
        self.remove_monitor_item(&id)
    }

    /// Pause monitoring of the self-monitor item.
    pub fn pause_self_monitor(&self) -> Result<()> {
        let id = self.require_self_monitor_id()?;
        self.pause_monitor_item(&id)
    }

    /// Resume monitoring of the self-monitor item.
    pub fn resume_self_monitor(&self) -> Result<()> {
        let id = self.require_self_monitor_id()?;
        self.resume_monitor_item(&id)
    }

    /// Start a background heartbeat reporter for the self-monitor item.
    pub fn start_self_heartbeat(&self, interval: Duration) -> Result<()> {
        let id = self.require_self_monitor_id()?;
        self.start_heartbeat(&id, interval);
        Ok(())
    }

    /// Stop the self-monitor heartbeat reporter, if running.
    pub fn stop_self_heartbeat(&self) {
        if let Some(id) = self.inner.self_monitor_id() {
            self.stop_heartbeat(&id);
        }
    }

    /// The id currently designated as "this process", if any.
    pub fn self_monitor_id(&self) -> Option<String> {
        self.inner.self_monitor_id()
    }

    /// Explicitly designate `id` as the self-monitor item.
    pub fn set_self_monitor_id(&self, id: impl Into<String>) {
        self.inner.set_self_monitor_id(Some(id.into()));
    }

    fn require_self_monitor_id(&self) -> Result<String> {
        self.inner
            .self_monitor_id()
            .ok_or_else(|| Error::Application("self monitor not set".to_string()))
    }
}

/// Path of the currently running executable.
pub fn current_exe_path() -> Option<PathBuf> {
    std::env::current_exe().ok()
}

/// Directory containing the currently running executable.
pub fn current_exe_dir() -> Option<PathBuf> {
    current_exe_path().and_then(|path| path.parent().map(|dir| dir.to_path_buf()))
}

/// Derive a display name from an executable path: base file name with the
/// extension stripped. Handles both separator styles so paths reported by a
/// foreign host still yield a sensible name.
fn derive_display_name(exe_path: &str) -> String {
    let base = exe_path.rsplit(['/', '\\']).next().unwrap_or(exe_path);
    let stem = match base.rfind('.') {
        Some(0) | None => base,
        Some(index) => &base[..index],
    };
    if stem.is_empty() {
        DEFAULT_SELF_MONITOR_NAME.to_string()
    } else {
        stem.to_string()
    }
}
