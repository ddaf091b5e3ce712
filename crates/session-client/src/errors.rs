//! Session client error types.
//!
//! Caller mistakes on unknown tile or attendee ids are deliberately not
//! represented here: those operations are no-ops. Errors only cover the
//! actor boundary, configuration, replay input and observer callbacks.

use thiserror::Error;

use crate::config::ConfigError;

/// Session client error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The session actor mailbox is closed or the reply was dropped.
    #[error("Session actor unavailable: {0}")]
    ActorUnavailable(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Replay script could not be read or parsed.
    #[error("Replay error: {0}")]
    Replay(String),
}

/// Failure reported by an observer callback.
///
/// Observer failures are isolated: they are logged and counted, and the
/// remaining observers still receive the notification.
#[derive(Debug, Error)]
pub enum ObserverError {
    /// The observer declined the notification.
    #[error("Observer rejected notification: {0}")]
    Rejected(String),

    /// The observer failed while handling the notification.
    #[error("Observer failed: {0}")]
    Failed(String),
}

/// Failure while introspecting the host environment.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Introspection is not supported on this platform.
    #[error("Environment introspection unavailable: {0}")]
    Unavailable(String),
}
