//! Watch command: register this process as a monitor item and heartbeat on
//! its behalf until interrupted.

use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::client::Client;

/// Register a self-monitor item and heartbeat for it until Ctrl-C.
///
/// When `keep` is false the item is removed again on exit.
pub fn execute(
    client: &Client,
    id: Option<String>,
    interval: Duration,
    heartbeat_timeout_ms: Option<u64>,
    keep: bool,
) -> Result<()> {
    let item_id = client
        .add_self_monitor(id, heartbeat_timeout_ms)
        .context("Failed to register self-monitor item")?;
    println!(
        "{} Watching as {} (heartbeat every {:?})",
        "→".cyan().bold(),
        item_id.bold(),
        interval
    );

    client
        .start_self_heartbeat(interval)
        .context("Failed to start self heartbeat")?;

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::Relaxed);
    })
    .context("Failed to install signal handler")?;

    while !interrupted.load(Ordering::Relaxed) {
        std::thread::sleep(Duration::from_millis(100));
    }

    println!("\n{} Stopping heartbeat...", "→".cyan().bold());
    client.stop_self_heartbeat();

    if !keep {
        client
            .remove_self_monitor()
            .context("Failed to remove self-monitor item")?;
        println!("{} Self-monitor item removed", "✓".green().bold());
    } else {
        println!(
            "{} Item {} left registered",
            "─".dimmed(),
            item_id.bold()
        );
    }
    Ok(())
}
