//! Meeting history states and event names.

use serde::{Deserialize, Serialize};

/// Analytics event names accepted by `publish_event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventName {
    MeetingStartRequested,
    MeetingStartSucceeded,
    MeetingStartFailed,
    MeetingEnded,
    MeetingFailed,
    AttendeePresenceReceived,
    AudioInputSelected,
    AudioInputFailed,
    VideoInputSelected,
    VideoInputFailed,
}

impl EventName {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MeetingStartRequested => "meetingStartRequested",
            Self::MeetingStartSucceeded => "meetingStartSucceeded",
            Self::MeetingStartFailed => "meetingStartFailed",
            Self::MeetingEnded => "meetingEnded",
            Self::MeetingFailed => "meetingFailed",
            Self::AttendeePresenceReceived => "attendeePresenceReceived",
            Self::AudioInputSelected => "audioInputSelected",
            Self::AudioInputFailed => "audioInputFailed",
            Self::VideoInputSelected => "videoInputSelected",
            Self::VideoInputFailed => "videoInputFailed",
        }
    }
}

/// States recorded in the meeting history.
///
/// Every [`EventName`] is also a history state: publishing an event
/// appends it to the history before observers are notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeetingHistoryState {
    Connecting,
    Reconnecting,
    SignalingDropped,
    ReceivingAudioDropped,
    MeetingReconnected,
    MeetingStartRequested,
    MeetingStartSucceeded,
    MeetingStartFailed,
    MeetingEnded,
    MeetingFailed,
    AttendeePresenceReceived,
    AudioInputSelected,
    AudioInputFailed,
    VideoInputSelected,
    VideoInputFailed,
}

impl From<EventName> for MeetingHistoryState {
    fn from(name: EventName) -> Self {
        match name {
            EventName::MeetingStartRequested => Self::MeetingStartRequested,
            EventName::MeetingStartSucceeded => Self::MeetingStartSucceeded,
            EventName::MeetingStartFailed => Self::MeetingStartFailed,
            EventName::MeetingEnded => Self::MeetingEnded,
            EventName::MeetingFailed => Self::MeetingFailed,
            EventName::AttendeePresenceReceived => Self::AttendeePresenceReceived,
            EventName::AudioInputSelected => Self::AudioInputSelected,
            EventName::AudioInputFailed => Self::AudioInputFailed,
            EventName::VideoInputSelected => Self::VideoInputSelected,
            EventName::VideoInputFailed => Self::VideoInputFailed,
        }
    }
}

/// One appended history record. Never mutated once appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingHistoryEntry {
    pub state: MeetingHistoryState,
    pub timestamp_ms: u64,
}
