//! Roster entry and the transport callbacks that feed it.

use common::types::AttendeeId;
use serde::{Deserialize, Serialize};

/// Appended to the display name of shared-content attendees.
pub const CONTENT_NAME_SUFFIX: &str = " «Content»";

/// Separator in external user ids; the display name is the last segment.
const EXTERNAL_ID_SEPARATOR: char = '#';

/// Presence callback: an attendee joined or left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEvent {
    pub attendee_id: AttendeeId,
    pub present: bool,
    pub external_user_id: String,
    /// The attendee left because the transport dropped them.
    #[serde(default)]
    pub dropped: bool,
}

/// Volume-indicator callback. `None` fields mean "unchanged".
///
/// `volume` and `signal_strength` are fractions in `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeIndicator {
    pub attendee_id: AttendeeId,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub muted: Option<bool>,
    #[serde(default)]
    pub signal_strength: Option<f64>,
}

/// Per-attendee presence and quality snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub attendee_id: AttendeeId,
    pub display_name: String,
    /// Last reported volume, 0-100.
    pub volume: Option<u8>,
    pub muted: Option<bool>,
    /// Last reported signal strength, 0-100.
    pub signal_strength: Option<u8>,
    /// True only for the single highlighted speaker.
    pub active: bool,
    pub score: Option<f64>,
}

/// Summary badge for an entry, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AttendeeStatus {
    /// Signal strength reported as zero.
    WeakSignal,
    Muted,
    Speaking,
    /// Non-zero volume but not the highlighted speaker.
    Audible,
    Idle,
}

impl RosterEntry {
    pub(crate) fn new(attendee_id: AttendeeId, external_user_id: &str) -> Self {
        let display_name = derive_display_name(&attendee_id, external_user_id);
        Self {
            attendee_id,
            display_name,
            volume: None,
            muted: None,
            signal_strength: None,
            active: false,
            score: None,
        }
    }

    /// Apply an indicator update, leaving `None` fields untouched.
    pub(crate) fn apply_indicator(&mut self, update: &VolumeIndicator) {
        if let Some(volume) = update.volume {
            self.volume = Some(to_percent(volume));
        }
        if let Some(muted) = update.muted {
            self.muted = Some(muted);
        }
        if let Some(signal) = update.signal_strength {
            self.signal_strength = Some(to_percent(signal));
        }
    }

    #[must_use]
    pub fn status(&self) -> AttendeeStatus {
        if self.signal_strength == Some(0) {
            AttendeeStatus::WeakSignal
        } else if self.muted == Some(true) {
            AttendeeStatus::Muted
        } else if self.active {
            AttendeeStatus::Speaking
        } else if self.volume.is_some_and(|v| v > 0) {
            AttendeeStatus::Audible
        } else {
            AttendeeStatus::Idle
        }
    }
}

/// Display name from an external user id: the segment after the last `#`,
/// with [`CONTENT_NAME_SUFFIX`] for shared-content attendees.
#[must_use]
pub fn derive_display_name(attendee_id: &AttendeeId, external_user_id: &str) -> String {
    let name = external_user_id
        .rsplit(EXTERNAL_ID_SEPARATOR)
        .next()
        .unwrap_or(external_user_id);
    if attendee_id.is_content() {
        format!("{name}{CONTENT_NAME_SUFFIX}")
    } else {
        name.to_string()
    }
}

/// Fraction in `[0.0, 1.0]` to a rounded percentage, clamped.
fn to_percent(fraction: f64) -> u8 {
    if fraction.is_nan() {
        return 0;
    }
    // Clamped to 0..=100 before the cast, so truncation cannot occur
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = (fraction * 100.0).round().clamp(0.0, 100.0) as u8;
    percent
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_takes_last_segment() {
        let id = AttendeeId::new("a1");
        assert_eq!(derive_display_name(&id, "org#team#alice"), "alice");
        assert_eq!(derive_display_name(&id, "bob"), "bob");
        assert_eq!(derive_display_name(&id, "trailing#"), "");
    }

    #[test]
    fn test_display_name_for_content_attendee() {
        let id = AttendeeId::new("a1#content");
        assert_eq!(derive_display_name(&id, "org#alice"), "alice «Content»");
    }

    #[test]
    fn test_apply_indicator_keeps_unreported_fields() {
        let mut entry = RosterEntry::new(AttendeeId::new("a"), "a");
        entry.apply_indicator(&VolumeIndicator {
            attendee_id: AttendeeId::new("a"),
            volume: Some(0.8),
            muted: Some(false),
            signal_strength: Some(0.9),
        });
        entry.apply_indicator(&VolumeIndicator {
            attendee_id: AttendeeId::new("a"),
            volume: Some(0.1),
            muted: None,
            signal_strength: None,
        });

        assert_eq!(entry.volume, Some(10));
        assert_eq!(entry.muted, Some(false));
        assert_eq!(entry.signal_strength, Some(90));
    }

    #[test]
    fn test_percent_conversion_rounds_and_clamps() {
        assert_eq!(to_percent(0.125), 13);
        assert_eq!(to_percent(1.7), 100);
        assert_eq!(to_percent(-0.3), 0);
        assert_eq!(to_percent(f64::NAN), 0);
    }

    #[test]
    fn test_status_priority() {
        let mut entry = RosterEntry::new(AttendeeId::new("a"), "a");
        assert_eq!(entry.status(), AttendeeStatus::Idle);

        entry.volume = Some(40);
        assert_eq!(entry.status(), AttendeeStatus::Audible);

        entry.active = true;
        assert_eq!(entry.status(), AttendeeStatus::Speaking);

        entry.muted = Some(true);
        assert_eq!(entry.status(), AttendeeStatus::Muted);

        entry.signal_strength = Some(0);
        assert_eq!(entry.status(), AttendeeStatus::WeakSignal);
    }

    #[test]
    fn test_indicator_deserializes_with_missing_fields() {
        let update: VolumeIndicator =
            serde_json::from_str(r#"{"attendeeId":"a","volume":0.5}"#).unwrap();
        assert_eq!(update.volume, Some(0.5));
        assert!(update.muted.is_none());
        assert!(update.signal_strength.is_none());
    }
}
