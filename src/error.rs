//! Error taxonomy for client operations.
//!
//! Every public operation returns `Result<T, Error>` so each call carries its
//! own failure description; there is no shared last-error field.

use thiserror::Error;

/// Errors surfaced by the procguard client.
#[derive(Debug, Error)]
pub enum Error {
    /// The channel could not be opened within the timeout, or a write/read on
    /// it failed. The channel is closed and must be reopened.
    #[error("connection error: {0}")]
    Connection(String),

    /// An exchange was attempted on a channel that is not connected.
    /// Reconnecting is the caller's responsibility.
    #[error("not connected")]
    NotConnected,

    /// The response payload failed to decode, or exceeded the size bound.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The supervisor answered `success = false` with a message
    /// (duplicate path, unknown id, ...).
    #[error("supervisor rejected request: {0}")]
    Application(String),

    /// A service-manager primitive failed.
    #[error("service management error: {0}")]
    Service(#[from] ServiceError),
}

/// Failures of the host service-manager primitives.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// `install` found an existing registration.
    #[error("service already exists")]
    AlreadyExists,

    /// The service is not registered with the manager.
    #[error("service not found")]
    NotFound,

    /// The manager rejected or failed the command.
    #[error("{0}")]
    Command(String),
}

/// Convenience alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// True when the failure means the channel must be reopened before the
    /// next exchange.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection(_) | Error::NotConnected)
    }
}
