//! One-shot heartbeat command.

use anyhow::{Context, Result};
use colored::Colorize;

use crate::client::Client;

/// Send a single heartbeat for `id`.
pub fn execute(client: &Client, id: String) -> Result<()> {
    client
        .send_heartbeat(&id)
        .with_context(|| format!("Heartbeat for {id} failed"))?;
    println!("{} Heartbeat accepted for {}", "✓".green().bold(), id.bold());
    Ok(())
}
