//! Client library for the Process Guard supervisor.
//!
//! The supervisor is a separate long-running service that runs and watches
//! registered executables. This crate is the in-process client: it registers
//! monitor items over the supervisor's local socket, relays periodic
//! heartbeats on their behalf, and manages the supervisor's own service
//! registration. It never decides liveness itself; it only reports and
//! queries.

pub mod channel;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod heartbeat;
pub mod models;
pub mod protocol;
pub mod service;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{Error, ServiceError};
pub use models::{MonitorItem, ProcessStatus, ServiceStatus};
