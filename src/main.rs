use anyhow::Result;
use clap::{Parser, Subcommand};
use procguard::commands::{heartbeat, items, service, status, watch};
use procguard::commands::items::ItemArgs;
use procguard::{Client, ClientConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "procguard")]
#[command(about = "Client for the Process Guard supervisor service", long_about = None)]
#[command(version)]
struct Cli {
    /// Path of the supervisor socket (overrides config/env)
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install the supervisor service if absent and start it if stopped
    Setup {
        /// Path to the supervisor executable
        service_path: PathBuf,
    },

    /// Manage the supervisor's service registration
    Service {
        #[command(subcommand)]
        command: ServiceCommands,
    },

    /// Register a new monitor item
    Add {
        /// Executable to monitor
        exe_path: String,

        /// Display name
        name: String,

        /// Item id (generated from a timestamp when omitted)
        #[arg(long)]
        id: Option<String>,

        /// Command-line arguments passed to the executable
        #[arg(long)]
        args: Option<String>,

        /// Heartbeat timeout in milliseconds (default: 1000)
        #[arg(long)]
        heartbeat_timeout_ms: Option<u64>,

        /// Register the item paused
        #[arg(long)]
        disabled: bool,
    },

    /// Replace an existing monitor item
    Update {
        /// Item id to update
        id: String,

        /// Executable to monitor
        exe_path: String,

        /// Display name
        name: String,

        /// Command-line arguments passed to the executable
        #[arg(long)]
        args: Option<String>,

        /// Heartbeat timeout in milliseconds (default: 1000)
        #[arg(long)]
        heartbeat_timeout_ms: Option<u64>,

        /// Leave the item paused
        #[arg(long)]
        disabled: bool,
    },

    /// Remove a monitor item
    Remove {
        /// Item id to remove
        id: String,
    },

    /// Pause monitoring of an item
    Pause {
        /// Item id to pause
        id: String,
    },

    /// Resume monitoring of an item
    Resume {
        /// Item id to resume
        id: String,
    },

    /// List all monitor items
    List,

    /// Show the supervisor's aggregate status
    Status,

    /// Send a single heartbeat for an item
    Heartbeat {
        /// Item id to heartbeat
        id: String,
    },

    /// Register this process as a monitor item and heartbeat until Ctrl-C
    Watch {
        /// Item id (generated as self-<timestamp> when omitted)
        #[arg(long)]
        id: Option<String>,

        /// Heartbeat interval in milliseconds
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,

        /// Heartbeat timeout in milliseconds the supervisor should apply
        #[arg(long)]
        heartbeat_timeout_ms: Option<u64>,

        /// Leave the item registered on exit
        #[arg(long)]
        keep: bool,
    },
}

#[derive(Subcommand)]
enum ServiceCommands {
    /// Register the supervisor with the service manager
    Install {
        /// Path to the supervisor executable
        service_path: PathBuf,
    },

    /// Remove the supervisor's service registration
    Uninstall,

    /// Start the supervisor service
    Start,

    /// Stop the supervisor service
    Stop,

    /// Show the registration and run state
    Info,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::load()?;
    if let Some(socket) = cli.socket {
        config.socket_path = socket;
    }
    let client = Client::with_config(config);

    match cli.command {
        Commands::Setup { service_path } => service::setup(&client, service_path),
        Commands::Service { command } => match command {
            ServiceCommands::Install { service_path } => service::install(&client, service_path),
            ServiceCommands::Uninstall => service::uninstall(&client),
            ServiceCommands::Start => service::start(&client),
            ServiceCommands::Stop => service::stop(&client),
            ServiceCommands::Info => service::info(&client),
        },
        Commands::Add {
            exe_path,
            name,
            id,
            args,
            heartbeat_timeout_ms,
            disabled,
        } => items::add(
            &client,
            ItemArgs {
                exe_path,
                name,
                id,
                args,
                heartbeat_timeout_ms,
                disabled,
            },
        ),
        Commands::Update {
            id,
            exe_path,
            name,
            args,
            heartbeat_timeout_ms,
            disabled,
        } => items::update(
            &client,
            id,
            ItemArgs {
                exe_path,
                name,
                id: None,
                args,
                heartbeat_timeout_ms,
                disabled,
            },
        ),
        Commands::Remove { id } => items::remove(&client, id),
        Commands::Pause { id } => items::pause(&client, id),
        Commands::Resume { id } => items::resume(&client, id),
        Commands::List => items::list(&client),
        Commands::Status => status::execute(&client),
        Commands::Heartbeat { id } => heartbeat::execute(&client, id),
        Commands::Watch {
            id,
            interval_ms,
            heartbeat_timeout_ms,
            keep,
        } => watch::execute(
            &client,
            id,
            Duration::from_millis(interval_ms),
            heartbeat_timeout_ms,
            keep,
        ),
    }
}
