//! Event attribute records and their merge.

use common::types::AttendeeId;
use serde::{Deserialize, Serialize};

use super::history::MeetingHistoryEntry;

/// Sentinel for environment facts that could not be determined.
pub const UNAVAILABLE: &str = "Unavailable";

/// Environment facts captured once per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSnapshot {
    pub agent_name: String,
    pub agent_version: String,
    pub agent_major_version: String,
    /// Device vendor and model, space separated.
    pub device_name: String,
    pub os_name: String,
    pub os_version: String,
}

impl EnvironmentSnapshot {
    /// Snapshot with every field set to [`UNAVAILABLE`].
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            agent_name: UNAVAILABLE.to_string(),
            agent_version: UNAVAILABLE.to_string(),
            agent_major_version: UNAVAILABLE.to_string(),
            device_name: UNAVAILABLE.to_string(),
            os_name: UNAVAILABLE.to_string(),
            os_version: UNAVAILABLE.to_string(),
        }
    }
}

impl Default for EnvironmentSnapshot {
    fn default() -> Self {
        Self::unavailable()
    }
}

/// Attributes supplied by the caller of `publish_event`.
///
/// The identity and timestamp fields override the tracker's own values
/// when set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSpecificAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signaling_open_duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poor_connection_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_video_tile_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_input_error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_input_error_message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendee_id: Option<AttendeeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_meeting_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
}

/// Attributes delivered to event receivers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAttributes {
    pub attendee_id: AttendeeId,
    pub external_user_id: String,
    pub meeting_id: String,
    pub external_meeting_id: String,
    pub meeting_history: Vec<MeetingHistoryEntry>,
    pub sdk_name: String,
    pub sdk_version: String,
    pub timestamp_ms: u64,
    #[serde(flatten)]
    pub environment: EnvironmentSnapshot,
    /// Event-specific fields. Identity overrides have already been applied
    /// to the fields above and are always `None` here.
    #[serde(flatten)]
    pub details: EventSpecificAttributes,
}

impl EventAttributes {
    /// Overlay event-specific attributes. Set fields win on collision.
    #[must_use]
    pub fn merged(mut self, mut overrides: EventSpecificAttributes) -> Self {
        if let Some(attendee_id) = overrides.attendee_id.take() {
            self.attendee_id = attendee_id;
        }
        if let Some(external_user_id) = overrides.external_user_id.take() {
            self.external_user_id = external_user_id;
        }
        if let Some(meeting_id) = overrides.meeting_id.take() {
            self.meeting_id = meeting_id;
        }
        if let Some(external_meeting_id) = overrides.external_meeting_id.take() {
            self.external_meeting_id = external_meeting_id;
        }
        if let Some(timestamp_ms) = overrides.timestamp_ms.take() {
            self.timestamp_ms = timestamp_ms;
        }
        self.details = overrides;
        self
    }
}
