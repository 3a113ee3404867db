//! Service lifecycle commands: setup, install, uninstall, start, stop.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::client::Client;

/// Install the supervisor service if absent and start it if stopped.
pub fn setup(client: &Client, service_path: PathBuf) -> Result<()> {
    println!("{} Setting up supervisor service...", "→".cyan().bold());
    client
        .quick_setup(&service_path)
        .context("Failed to set up supervisor service")?;
    println!("{} Supervisor service installed and running", "✓".green().bold());
    Ok(())
}

/// Register the supervisor with the service manager.
pub fn install(client: &Client, service_path: PathBuf) -> Result<()> {
    client
        .install_service(&service_path)
        .context("Failed to install supervisor service")?;
    println!("{} Service installed", "✓".green().bold());
    Ok(())
}

/// Remove the supervisor's service registration.
pub fn uninstall(client: &Client) -> Result<()> {
    client
        .uninstall_service()
        .context("Failed to uninstall supervisor service")?;
    println!("{} Service uninstalled", "✓".green().bold());
    Ok(())
}

/// Start the supervisor service.
pub fn start(client: &Client) -> Result<()> {
    println!("{} Starting service...", "→".cyan().bold());
    client.start_service().context("Failed to start service")?;
    if client.is_service_running() {
        println!("{} Service running", "✓".green().bold());
    } else {
        println!("{} Start accepted; service not yet running", "─".dimmed());
    }
    Ok(())
}

/// Stop the supervisor service.
pub fn stop(client: &Client) -> Result<()> {
    if !client.is_service_running() {
        println!("{} Service is not running", "─".dimmed());
        return Ok(());
    }
    println!("{} Stopping service...", "→".cyan().bold());
    client.stop_service().context("Failed to stop service")?;
    println!("{} Stop command accepted", "✓".green().bold());
    Ok(())
}

/// Show the registration and run state.
pub fn info(client: &Client) -> Result<()> {
    let installed = client.is_service_installed();
    let running = client.is_service_running();

    let state = |ok: bool| {
        if ok {
            "yes".green()
        } else {
            "no".red()
        }
    };
    println!("installed: {}", state(installed));
    println!("running:   {}", state(running));
    Ok(())
}
