//! CLI subcommand implementations.

pub mod heartbeat;
pub mod items;
pub mod service;
pub mod status;
pub mod watch;
