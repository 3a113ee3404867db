//! Aggregate status command.

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use colored::Colorize;

use crate::client::Client;
use crate::models::ProcessStatus;

/// Show the supervisor's aggregate status.
pub fn execute(client: &Client) -> Result<()> {
    let decoded = client
        .get_service_status()
        .context("Failed to query service status")?;
    let status = &decoded.value;

    let running = if status.service_running {
        "running".green().bold()
    } else {
        "stopped".red().bold()
    };
    println!("Supervisor: {running}  ({} items)", status.total_items);

    if !status.items.is_empty() {
        println!("─────────────────────────────────────────────────────────");
        for item in &status.items {
            print_item(item);
        }
    }

    if decoded.skipped > 0 {
        eprintln!(
            "{} Skipped {} malformed status entr{}: {}",
            "!".yellow().bold(),
            decoded.skipped,
            if decoded.skipped == 1 { "y" } else { "ies" },
            decoded.last_error.as_deref().unwrap_or("unknown")
        );
    }
    Ok(())
}

fn print_item(item: &ProcessStatus) {
    let alive = if item.is_alive {
        "alive".green()
    } else {
        "dead".red()
    };
    let heartbeat = if item.is_heartbeat_ok {
        "ok".green()
    } else {
        "stale".yellow()
    };
    let pid = item
        .process_id
        .map(|pid| pid.to_string())
        .unwrap_or_else(|| "-".to_string());

    println!(
        "  {}  {}  pid={pid}  {alive}/{heartbeat}  restarts={}  last heartbeat: {}",
        item.id.bold(),
        item.name,
        item.restart_count,
        format_heartbeat(item.last_heartbeat_ms)
    );
}

fn format_heartbeat(epoch_ms: i64) -> String {
    if epoch_ms <= 0 {
        return "never".to_string();
    }
    match Utc.timestamp_millis_opt(epoch_ms).single() {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "invalid".to_string(),
    }
}
