//! Background heartbeat reporters, one per monitored item id.
//!
//! Each reporter owns its cancellation flag, captured at spawn time; the
//! registry exists only to locate and join reporters, it is never consulted
//! from inside a reporter loop. The registry lock is distinct from the
//! channel lock, so starting/stopping reporters never blocks on an in-flight
//! request.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Granularity of the cancellable sleep between heartbeats.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

struct Reporter {
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Manages the per-item reporter threads.
#[derive(Default)]
pub struct HeartbeatSupervisor {
    reporters: Mutex<HashMap<String, Reporter>>,
}

impl HeartbeatSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a reporter for `id`, invoking `tick` every `interval`.
    ///
    /// Starting an id that is already running is a no-op; returns whether a
    /// new reporter was spawned.
    pub fn start(&self, id: &str, interval: Duration, tick: impl Fn() + Send + 'static) -> bool {
        let mut reporters = match self.reporters.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if reporters.contains_key(id) {
            tracing::debug!(id, "heartbeat reporter already running");
            return false;
        }

        let cancel = Arc::new(AtomicBool::new(false));
        let reporter_cancel = Arc::clone(&cancel);
        let reporter_id = id.to_string();

        let handle = thread::spawn(move || {
            tracing::debug!(id = %reporter_id, "heartbeat reporter started");
            while !reporter_cancel.load(Ordering::Relaxed) {
                tick();
                if sleep_cancellable(&reporter_cancel, interval) {
                    break;
                }
            }
            tracing::debug!(id = %reporter_id, "heartbeat reporter exiting");
        });

        reporters.insert(id.to_string(), Reporter { cancel, handle });
        true
    }

    /// Stop the reporter for `id`, blocking until its thread has exited.
    ///
    /// Worst-case latency is the remaining sleep interval plus one in-flight
    /// request. Unknown ids are a no-op, not a failure.
    pub fn stop(&self, id: &str) {
        let mut reporters = match self.reporters.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(reporter) = reporters.remove(id) {
            reporter.cancel.store(true, Ordering::Relaxed);
            let _ = reporter.handle.join();
        }
    }

    /// Cancel and join every reporter, leaving the registry empty.
    ///
    /// Safe to call during teardown with no reporters running.
    pub fn stop_all(&self) {
        let mut reporters = match self.reporters.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        // Signal everything first so reporters wind down concurrently, then
        // join them one by one.
        for reporter in reporters.values() {
            reporter.cancel.store(true, Ordering::Relaxed);
        }
        for (_, reporter) in reporters.drain() {
            let _ = reporter.handle.join();
        }
    }

    /// Whether a reporter is currently registered for `id`.
    pub fn is_running(&self, id: &str) -> bool {
        self.reporters
            .lock()
            .map(|reporters| reporters.contains_key(id))
            .unwrap_or(false)
    }

    /// Number of active reporters.
    pub fn active_count(&self) -> usize {
        self.reporters
            .lock()
            .map(|reporters| reporters.len())
            .unwrap_or(0)
    }
}

/// Sleep for `interval` in short slices, returning early (true) when the
/// cancellation flag is set.
fn sleep_cancellable(cancel: &AtomicBool, interval: Duration) -> bool {
    let deadline = Instant::now() + interval;
    loop {
        if cancel.load(Ordering::Relaxed) {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}
