//! Session client configuration.
//!
//! Configuration is loaded from environment variables. Identity fields are
//! required; everything else has a default.

use common::types::AttendeeId;
use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Default active-speaker score cadence. Zero disables score reporting.
pub const DEFAULT_SPEAKER_SCORE_INTERVAL_MS: u64 = 0;

/// Default session actor mailbox capacity.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 500;

/// Session client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Meeting ID assigned by the service.
    pub meeting_id: String,

    /// Local attendee ID.
    pub attendee_id: AttendeeId,

    /// Meeting ID supplied by the application (default: empty).
    pub external_meeting_id: String,

    /// User ID supplied by the application (default: the attendee ID).
    pub external_user_id: String,

    /// Active-speaker score cadence in milliseconds (default: 0, disabled).
    pub speaker_score_interval_ms: u64,

    /// Name of the embedding application, reported in event attributes.
    pub agent_name: Option<String>,

    /// Version of the embedding application, reported in event attributes.
    pub agent_version: Option<String>,

    /// Session actor mailbox capacity (default: 500).
    pub mailbox_capacity: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl SessionConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let meeting_id = required(vars, "SESSION_MEETING_ID")?;
        let attendee_id = AttendeeId::new(required(vars, "SESSION_ATTENDEE_ID")?);

        let external_meeting_id = vars
            .get("SESSION_EXTERNAL_MEETING_ID")
            .cloned()
            .unwrap_or_default();

        let external_user_id = vars
            .get("SESSION_EXTERNAL_USER_ID")
            .cloned()
            .unwrap_or_else(|| attendee_id.to_string());

        let speaker_score_interval_ms = parsed(
            vars,
            "SESSION_SPEAKER_SCORE_INTERVAL_MS",
            DEFAULT_SPEAKER_SCORE_INTERVAL_MS,
        )?;

        let mailbox_capacity = parsed(vars, "SESSION_MAILBOX_CAPACITY", DEFAULT_MAILBOX_CAPACITY)?;
        if mailbox_capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_MAILBOX_CAPACITY must be greater than zero".to_string(),
            ));
        }

        let agent_name = non_empty(vars, "SESSION_AGENT_NAME");
        let agent_version = non_empty(vars, "SESSION_AGENT_VERSION");

        Ok(SessionConfig {
            meeting_id,
            attendee_id,
            external_meeting_id,
            external_user_id,
            speaker_score_interval_ms,
            agent_name,
            agent_version,
            mailbox_capacity,
        })
    }
}

fn required(vars: &HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    vars.get(key)
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn non_empty(vars: &HashMap<String, String>, key: &str) -> Option<String> {
    vars.get(key).filter(|v| !v.trim().is_empty()).cloned()
}

fn parsed<T: FromStr>(
    vars: &HashMap<String, String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match vars.get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(format!("{key}={raw}"))),
        None => Ok(default),
    }
}
