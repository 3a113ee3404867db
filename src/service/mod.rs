//! Service lifecycle controller.
//!
//! Wraps the host service manager (systemd, driven through `systemctl`) with
//! install/uninstall/start/stop operations. Each operation is a fresh
//! `systemctl` invocation; no manager handle is held between calls. `start`
//! and `stop` poll the reported state up to [`POLL_ATTEMPTS`] times at
//! [`POLL_INTERVAL`], a ~30 s bound.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::error::ServiceError;

/// Number of state polls after a start/stop command.
pub const POLL_ATTEMPTS: u32 = 60;

/// Pause between state polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Grace period given to a running service before uninstall deletes the
/// registration. Best-effort; uninstall does not poll for a full stop.
const UNINSTALL_GRACE: Duration = Duration::from_secs(1);

/// Controls the supervisor's registration with the service manager.
pub struct ServiceController {
    service_name: String,
    unit_dir: PathBuf,
}

impl ServiceController {
    pub fn new(service_name: impl Into<String>, unit_dir: impl Into<PathBuf>) -> Self {
        Self {
            service_name: service_name.into(),
            unit_dir: unit_dir.into(),
        }
    }

    /// Unit name as systemd knows it.
    pub fn unit_name(&self) -> String {
        format!("{}.service", self.service_name)
    }

    /// Path of the unit file this controller installs.
    pub fn unit_path(&self) -> PathBuf {
        self.unit_dir.join(self.unit_name())
    }

    /// Whether the service is registered with the manager.
    pub fn is_installed(&self) -> bool {
        if self.unit_path().exists() {
            return true;
        }
        // The unit may have been installed outside our unit directory.
        self.systemctl_query(&["cat", &self.unit_name()])
    }

    /// Whether the manager reports the service as active.
    pub fn is_running(&self) -> bool {
        self.systemctl_query(&["is-active", "--quiet", &self.unit_name()])
    }

    /// Register the service, pointing it at `exec_path`.
    ///
    /// Fails with [`ServiceError::AlreadyExists`] when a registration is
    /// already present, distinctly from other manager errors.
    pub fn install(&self, exec_path: &Path) -> Result<(), ServiceError> {
        if self.is_installed() {
            return Err(ServiceError::AlreadyExists);
        }

        let unit_path = self.unit_path();
        std::fs::write(&unit_path, render_unit(&self.service_name, exec_path)).map_err(|e| {
            ServiceError::Command(format!("write unit file {}: {e}", unit_path.display()))
        })?;

        let registered = self
            .systemctl(&["daemon-reload"])
            .and_then(|_| self.systemctl(&["enable", &self.unit_name()]));
        if let Err(e) = registered {
            // A leftover unit file would make a retried install report
            // AlreadyExists.
            let _ = std::fs::remove_file(&unit_path);
            return Err(e);
        }

        tracing::debug!(unit = %unit_path.display(), "service installed");
        Ok(())
    }

    /// Remove the registration.
    ///
    /// A running service gets a stop request and a fixed grace period first;
    /// the deletion proceeds regardless of whether the stop completed.
    pub fn uninstall(&self) -> Result<(), ServiceError> {
        if !self.is_installed() {
            return Err(ServiceError::NotFound);
        }

        if self.is_running() {
            let _ = self.systemctl(&["stop", &self.unit_name()]);
            std::thread::sleep(UNINSTALL_GRACE);
        }

        let _ = self.systemctl(&["disable", &self.unit_name()]);

        let unit_path = self.unit_path();
        if let Err(e) = std::fs::remove_file(&unit_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                return Err(ServiceError::Command(format!(
                    "remove unit file {}: {e}",
                    unit_path.display()
                )));
            }
        }

        self.systemctl(&["daemon-reload"])?;
        Ok(())
    }

    /// Start the service and wait (bounded) for it to report Running.
    ///
    /// The result reflects whether the start command was accepted; the
    /// bounded poll is a courtesy wait, not a success condition.
    pub fn start(&self) -> Result<(), ServiceError> {
        self.systemctl(&["start", &self.unit_name()])?;
        self.wait_for(|| self.is_running());
        Ok(())
    }

    /// Stop the service and wait (bounded) for it to report Stopped.
    ///
    /// As with [`start`](Self::start), the result reflects command
    /// acceptance, not the final polled state.
    pub fn stop(&self) -> Result<(), ServiceError> {
        self.systemctl(&["stop", &self.unit_name()])?;
        self.wait_for(|| !self.is_running());
        Ok(())
    }

    /// Poll `reached` up to the bounded attempt count.
    fn wait_for(&self, reached: impl Fn() -> bool) {
        for _ in 0..POLL_ATTEMPTS {
            if reached() {
                return;
            }
            std::thread::sleep(POLL_INTERVAL);
        }
        tracing::warn!(
            unit = %self.unit_name(),
            "service did not reach expected state within poll bound"
        );
    }

    /// Run a systemctl command, mapping failure to a manager error.
    fn systemctl(&self, args: &[&str]) -> Result<(), ServiceError> {
        let output = Command::new("systemctl")
            .args(args)
            .output()
            .map_err(|e| ServiceError::Command(format!("failed to run systemctl: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ServiceError::Command(format!(
                "systemctl {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }
        Ok(())
    }

    /// Run a systemctl query where failure just means "no".
    fn systemctl_query(&self, args: &[&str]) -> bool {
        Command::new("systemctl")
            .args(args)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

/// Render the unit file contents for the supervisor executable.
fn render_unit(service_name: &str, exec_path: &Path) -> String {
    format!(
        "[Unit]\n\
         Description=Process Guard supervisor ({service_name})\n\
         After=network.target\n\
         \n\
         [Service]\n\
         Type=simple\n\
         ExecStart={}\n\
         Restart=always\n\
         RestartSec=3\n\
         \n\
         [Install]\n\
         WantedBy=multi-user.target\n",
        exec_path.display()
    )
}
