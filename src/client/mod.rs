//! Client facade over the channel, codec, service controller, and heartbeat
//! supervisor.
//!
//! Every high-level operation first ensures the channel is connected,
//! reconnecting if needed, and fails fast when reconnection fails. The
//! channel itself is connect-per-call: a completed exchange closes it, so
//! consecutive operations each reconnect.

mod self_monitor;

pub use self_monitor::{current_exe_dir, current_exe_path, DEFAULT_SELF_MONITOR_NAME};

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::channel::ChannelSession;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::heartbeat::HeartbeatSupervisor;
use crate::models::{epoch_millis, MonitorItem, ServiceStatus};
use crate::protocol::{self, Decoded, Request, Response};
use crate::service::ServiceController;

/// Called with the item id when the supervisor rejects a heartbeat.
pub type HeartbeatFailedCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Called with the new connection state on connect/disconnect.
pub type ConnectedChangedCallback = Box<dyn Fn(bool) + Send + Sync>;

/// State shared with heartbeat reporter threads.
pub(crate) struct ClientInner {
    config: ClientConfig,
    channel: ChannelSession,
    heartbeats: HeartbeatSupervisor,
    heartbeat_failed: Mutex<Option<HeartbeatFailedCallback>>,
    connected_changed: Mutex<Option<ConnectedChangedCallback>>,
    self_monitor_id: Mutex<Option<String>>,
}

/// Client for the Process Guard supervisor.
pub struct Client {
    inner: Arc<ClientInner>,
    service: ServiceController,
}

impl Client {
    /// Create a client using configuration from file/environment defaults.
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self::with_config(ClientConfig::load()?))
    }

    /// Create a client with explicit configuration.
    pub fn with_config(config: ClientConfig) -> Self {
        let channel = ChannelSession::new(&config.socket_path, config.io_timeout);
        let service = ServiceController::new(&config.service_name, &config.unit_dir);
        Self {
            inner: Arc::new(ClientInner {
                config,
                channel,
                heartbeats: HeartbeatSupervisor::new(),
                heartbeat_failed: Mutex::new(None),
                connected_changed: Mutex::new(None),
                self_monitor_id: Mutex::new(None),
            }),
            service,
        }
    }

    // --- connection ---------------------------------------------------------

    /// Open the channel, retrying a busy endpoint up to `timeout`.
    pub fn connect(&self, timeout: Duration) -> Result<()> {
        self.inner.connect(timeout)
    }

    /// Open the channel with the configured default timeout.
    pub fn connect_default(&self) -> Result<()> {
        self.inner.connect(self.inner.config.connect_timeout)
    }

    /// Close the channel. Idempotent.
    pub fn disconnect(&self) {
        self.inner.channel.disconnect();
        self.inner.notify_connected(false);
    }

    /// Whether the most recent channel operation left the channel open.
    pub fn is_connected(&self) -> bool {
        self.inner.channel.is_connected()
    }

    // --- service lifecycle --------------------------------------------------

    pub fn is_service_installed(&self) -> bool {
        self.service.is_installed()
    }

    pub fn is_service_running(&self) -> bool {
        self.service.is_running()
    }

    pub fn install_service(&self, service_path: &Path) -> Result<()> {
        Ok(self.service.install(service_path)?)
    }

    pub fn uninstall_service(&self) -> Result<()> {
        Ok(self.service.uninstall()?)
    }

    pub fn start_service(&self) -> Result<()> {
        Ok(self.service.start()?)
    }

    pub fn stop_service(&self) -> Result<()> {
        Ok(self.service.stop()?)
    }

    /// Install the supervisor service if absent, then start it if stopped,
    /// short-circuiting on the first failure.
    pub fn quick_setup(&self, service_path: &Path) -> Result<()> {
        if !self.is_service_installed() {
            self.install_service(service_path)?;
        }
        if !self.is_service_running() {
            self.start_service()?;
        }
        Ok(())
    }

    /// Alias for [`quick_setup`](Self::quick_setup).
    pub fn ensure_service_installed(&self, service_path: &Path) -> Result<()> {
        self.quick_setup(service_path)
    }

    /// Start the service when installed but not running.
    pub fn ensure_service_running(&self) -> Result<()> {
        if !self.is_service_installed() {
            return Err(Error::Service(crate::error::ServiceError::NotFound));
        }
        if !self.is_service_running() {
            self.start_service()?;
        }
        Ok(())
    }

    // --- monitor items ------------------------------------------------------

    /// Register a monitor item with the supervisor.
    ///
    /// Validates the item fields, then rejects an `exe_path` that is already
    /// monitored before sending the add request.
    pub fn add_monitor_item(&self, item: &MonitorItem) -> Result<()> {
        if item.id.is_empty() {
            return Err(Error::Application("item id cannot be empty".to_string()));
        }
        if item.exe_path.is_empty() {
            return Err(Error::Application(
                "executable path cannot be empty".to_string(),
            ));
        }
        if item.name.is_empty() {
            return Err(Error::Application("item name cannot be empty".to_string()));
        }

        let existing = self.get_all_monitor_items()?;
        if existing
            .value
            .iter()
            .any(|other| other.exe_path == item.exe_path)
        {
            return Err(Error::Application(
                "executable path already monitored".to_string(),
            ));
        }

        self.inner.request_ok(&Request::Add {
            config: item.clone(),
        })
    }

    /// Replace an existing monitor item (matched by id).
    pub fn update_monitor_item(&self, item: &MonitorItem) -> Result<()> {
        self.inner.request_ok(&Request::Update {
            config: item.clone(),
        })
    }

    /// Remove a monitor item by id.
    pub fn remove_monitor_item(&self, id: &str) -> Result<()> {
        self.inner
            .request_ok(&Request::Remove { id: id.to_string() })
    }

    /// Resume monitoring of an item.
    pub fn start_monitor_item(&self, id: &str) -> Result<()> {
        self.inner
            .request_ok(&Request::Start { id: id.to_string() })
    }

    /// Pause monitoring of an item.
    pub fn stop_monitor_item(&self, id: &str) -> Result<()> {
        self.inner.request_ok(&Request::Stop { id: id.to_string() })
    }

    /// Alias for [`stop_monitor_item`](Self::stop_monitor_item).
    pub fn pause_monitor_item(&self, id: &str) -> Result<()> {
        self.stop_monitor_item(id)
    }

    /// Alias for [`start_monitor_item`](Self::start_monitor_item).
    pub fn resume_monitor_item(&self, id: &str) -> Result<()> {
        self.start_monitor_item(id)
    }

    /// Fetch all monitor items, skipping entries that fail to decode.
    pub fn get_all_monitor_items(&self) -> Result<Decoded<Vec<MonitorItem>>> {
        let response = self.inner.exchange(&Request::List)?;
        if !response.success {
            return Err(Error::Application(response.message_or_default()));
        }
        protocol::decode_items(&response)
    }

    /// Fetch the aggregate service status, skipping entries that fail to
    /// decode.
    pub fn get_service_status(&self) -> Result<Decoded<ServiceStatus>> {
        let response = self.inner.exchange(&Request::Status)?;
        if !response.success {
            return Err(Error::Application(response.message_or_default()));
        }
        protocol::decode_status(&response)
    }

    // --- heartbeats ---------------------------------------------------------

    /// Send one heartbeat for `id`, stamped with the current epoch-ms time.
    pub fn send_heartbeat(&self, id: &str) -> Result<()> {
        self.inner.send_heartbeat(id)
    }

    /// Start a background reporter that heartbeats `id` every `interval`.
    /// No-op when a reporter for `id` is already running.
    pub fn start_heartbeat(&self, id: &str, interval: Duration) {
        let inner = Arc::clone(&self.inner);
        let item_id = id.to_string();
        self.inner.heartbeats.start(id, interval, move || {
            if let Err(e) = inner.send_heartbeat(&item_id) {
                // The reporter keeps its interval regardless of failures.
                tracing::warn!(id = %item_id, "heartbeat failed: {e}");
            }
        });
    }

    /// Stop the reporter for `id`, blocking until its thread has exited.
    /// No-op for ids with no active reporter.
    pub fn stop_heartbeat(&self, id: &str) {
        self.inner.heartbeats.stop(id);
    }

    /// Cancel and join every active reporter.
    pub fn stop_all_heartbeats(&self) {
        self.inner.heartbeats.stop_all();
    }

    /// Whether a reporter is active for `id`.
    pub fn heartbeat_running(&self, id: &str) -> bool {
        self.inner.heartbeats.is_running(id)
    }

    // --- callbacks ----------------------------------------------------------

    /// Register a callback invoked when the supervisor rejects a heartbeat.
    pub fn on_heartbeat_failed(&self, callback: impl Fn(&str) + Send + Sync + 'static) {
        if let Ok(mut slot) = self.inner.heartbeat_failed.lock() {
            *slot = Some(Box::new(callback));
        }
    }

    /// Register a callback invoked with the outcome of every connect attempt
    /// and on every disconnect, regardless of the prior state.
    pub fn on_connected_changed(&self, callback: impl Fn(bool) + Send + Sync + 'static) {
        if let Ok(mut slot) = self.inner.connected_changed.lock() {
            *slot = Some(Box::new(callback));
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.inner.heartbeats.stop_all();
        self.inner.channel.disconnect();
    }
}

impl ClientInner {
    fn connect(&self, timeout: Duration) -> Result<()> {
        let result = self.channel.connect(timeout);
        self.notify_connected(result.is_ok());
        result
    }

    /// Reconnect when the previous exchange closed the channel.
    fn ensure_connected(&self) -> Result<()> {
        if self.channel.is_connected() {
            return Ok(());
        }
        self.connect(self.config.connect_timeout)
    }

    /// One request/response exchange, reconnecting first if needed.
    fn exchange(&self, request: &Request) -> Result<Response> {
        self.ensure_connected()?;
        self.channel.send_request(request)
    }

    /// Exchange and map a `success = false` envelope to an application error.
    fn request_ok(&self, request: &Request) -> Result<()> {
        let response = self.exchange(request)?;
        if response.success {
            Ok(())
        } else {
            Err(Error::Application(response.message_or_default()))
        }
    }

    pub(crate) fn send_heartbeat(&self, id: &str) -> Result<()> {
        let result = self.request_ok(&Request::Heartbeat {
            item_id: id.to_string(),
            timestamp: epoch_millis(),
        });

        if let Err(Error::Application(_)) = &result {
            // Supervisor rejected the heartbeat (unknown id, paused item, ...)
            if let Ok(slot) = self.heartbeat_failed.lock() {
                if let Some(callback) = slot.as_ref() {
                    callback(id);
                }
            }
        }
        result
    }

    fn notify_connected(&self, connected: bool) {
        if let Ok(slot) = self.connected_changed.lock() {
            if let Some(callback) = slot.as_ref() {
                callback(connected);
            }
        }
    }

    pub(crate) fn self_monitor_id(&self) -> Option<String> {
        self.self_monitor_id.lock().ok().and_then(|id| id.clone())
    }

    pub(crate) fn set_self_monitor_id(&self, id: Option<String>) {
        if let Ok(mut slot) = self.self_monitor_id.lock() {
            *slot = id;
        }
    }
}
