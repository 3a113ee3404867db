//! Monitor item commands: add, update, remove, pause, resume, list.

use anyhow::{Context, Result};
use colored::Colorize;

use crate::client::Client;
use crate::models::{MonitorItem, DEFAULT_HEARTBEAT_TIMEOUT_MS};

/// Item fields shared by the add and update commands.
pub struct ItemArgs {
    pub exe_path: String,
    pub name: String,
    pub id: Option<String>,
    pub args: Option<String>,
    pub heartbeat_timeout_ms: Option<u64>,
    pub disabled: bool,
}

impl ItemArgs {
    fn into_item(self) -> MonitorItem {
        let mut item = MonitorItem::create(self.exe_path, self.name, self.id)
            .with_heartbeat_timeout_ms(
                self.heartbeat_timeout_ms
                    .unwrap_or(DEFAULT_HEARTBEAT_TIMEOUT_MS),
            );
        if let Some(args) = self.args {
            item = item.with_args(args);
        }
        item.enabled = !self.disabled;
        item
    }
}

/// Register a new monitor item.
pub fn add(client: &Client, args: ItemArgs) -> Result<()> {
    let item = args.into_item();
    let id = item.id.clone();
    client
        .add_monitor_item(&item)
        .with_context(|| format!("Failed to add monitor item {id}"))?;
    println!("{} Added monitor item {}", "✓".green().bold(), id.bold());
    Ok(())
}

/// Replace an existing monitor item.
pub fn update(client: &Client, id: String, args: ItemArgs) -> Result<()> {
    let mut item = args.into_item();
    item.id = id.clone();
    client
        .update_monitor_item(&item)
        .with_context(|| format!("Failed to update monitor item {id}"))?;
    println!("{} Updated monitor item {}", "✓".green().bold(), id.bold());
    Ok(())
}

/// Remove a monitor item by id.
pub fn remove(client: &Client, id: String) -> Result<()> {
    client
        .remove_monitor_item(&id)
        .with_context(|| format!("Failed to remove monitor item {id}"))?;
    println!("{} Removed monitor item {}", "✓".green().bold(), id.bold());
    Ok(())
}

/// Pause monitoring of an item.
pub fn pause(client: &Client, id: String) -> Result<()> {
    client
        .pause_monitor_item(&id)
        .with_context(|| format!("Failed to pause monitor item {id}"))?;
    println!("{} Paused {}", "✓".green().bold(), id.bold());
    Ok(())
}

/// Resume monitoring of an item.
pub fn resume(client: &Client, id: String) -> Result<()> {
    client
        .resume_monitor_item(&id)
        .with_context(|| format!("Failed to resume monitor item {id}"))?;
    println!("{} Resumed {}", "✓".green().bold(), id.bold());
    Ok(())
}

/// List all monitor items.
pub fn list(client: &Client) -> Result<()> {
    let decoded = client
        .get_all_monitor_items()
        .context("Failed to list monitor items")?;

    if decoded.value.is_empty() {
        println!("(no monitor items)");
    } else {
        println!("Monitor items:");
        println!("─────────────────────────────────────────────────────────");
        for item in &decoded.value {
            let state = if item.enabled {
                "enabled".green()
            } else {
                "paused".yellow()
            };
            println!(
                "  {}  {}  {}  [{}]",
                item.id.bold(),
                item.name,
                item.exe_path.dimmed(),
                state
            );
        }
    }

    if decoded.skipped > 0 {
        eprintln!(
            "{} Skipped {} malformed entr{}: {}",
            "!".yellow().bold(),
            decoded.skipped,
            if decoded.skipped == 1 { "y" } else { "ies" },
            decoded.last_error.as_deref().unwrap_or("unknown")
        );
    }
    Ok(())
}
