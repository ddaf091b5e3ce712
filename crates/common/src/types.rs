//! Common data types for session components.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between an attendee's base id and its modality suffix.
pub const MODALITY_SEPARATOR: char = '#';

/// Modality suffix carried by attendees that represent shared content.
pub const MODALITY_CONTENT: &str = "content";

/// Identifier of a call attendee as assigned by the media service.
///
/// Shared-content attendees reuse the presenter's id with a `#content`
/// modality suffix, e.g. `a1b2#content`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendeeId(pub String);

impl AttendeeId {
    /// Create an attendee id from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id without any modality suffix.
    #[must_use]
    pub fn base(&self) -> &str {
        self.0
            .split(MODALITY_SEPARATOR)
            .next()
            .unwrap_or(self.0.as_str())
    }

    /// The modality suffix, present only when the id has exactly one separator.
    #[must_use]
    pub fn modality(&self) -> Option<&str> {
        let mut parts = self.0.split(MODALITY_SEPARATOR);
        let _base = parts.next();
        match (parts.next(), parts.next()) {
            (Some(modality), None) if !modality.is_empty() => Some(modality),
            _ => None,
        }
    }

    /// Returns whether the id carries the given modality.
    #[must_use]
    pub fn has_modality(&self, modality: &str) -> bool {
        !modality.is_empty() && self.modality() == Some(modality)
    }

    /// Returns whether this attendee represents shared content rather than a person.
    #[must_use]
    pub fn is_content(&self) -> bool {
        self.has_modality(MODALITY_CONTENT)
    }
}

impl fmt::Display for AttendeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AttendeeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AttendeeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of a video tile. Allocated monotonically, never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub u64);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of an externally owned render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderTargetId(pub u64);

impl fmt::Display for RenderTargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_attendee_has_no_modality() {
        let id = AttendeeId::new("a1b2c3");
        assert_eq!(id.base(), "a1b2c3");
        assert_eq!(id.modality(), None);
        assert!(!id.is_content());
    }

    #[test]
    fn test_content_attendee_modality() {
        let id = AttendeeId::new("a1b2c3#content");
        assert_eq!(id.base(), "a1b2c3");
        assert_eq!(id.modality(), Some("content"));
        assert!(id.is_content());
        assert!(!id.has_modality(""));
    }

    #[test]
    fn test_multiple_separators_have_no_modality() {
        let id = AttendeeId::new("a#content#extra");
        assert_eq!(id.base(), "a");
        assert_eq!(id.modality(), None);
        assert!(!id.is_content());
    }

    #[test]
    fn test_trailing_separator_has_no_modality() {
        let id = AttendeeId::new("a#");
        assert_eq!(id.modality(), None);
    }

    #[test]
    fn test_ids_serialize_transparently() {
        assert_eq!(
            serde_json::to_string(&AttendeeId::new("x")).unwrap(),
            "\"x\""
        );
        assert_eq!(serde_json::to_string(&TileId(7)).unwrap(), "7");
        assert_eq!(serde_json::to_string(&RenderTargetId(9)).unwrap(), "9");
    }

    #[test]
    fn test_tile_id_ordering() {
        assert!(TileId(1) < TileId(2));
        assert_eq!(format!("{}", TileId(42)), "42");
    }
}
