//! Interfaces consumed from the media/transport layer.
//!
//! Capture, encoding, network transmission and rendering all live outside
//! this crate. The engine only sees the narrow verbs below, and receives
//! presence, indicator and audio-sample callbacks through the session actor.

use common::types::{AttendeeId, RenderTargetId};
use std::fmt;

/// Handle to an externally supplied media stream.
///
/// A tile takes exclusive ownership of the handle while bound. Dropping the
/// handle releases the stream back to the transport layer.
pub trait MediaStream: Send + fmt::Debug {
    /// Transport-assigned stream identifier.
    fn id(&self) -> &str;
}

/// Descriptor of an externally owned render surface.
///
/// The registry records only the relation between a tile and the surface;
/// the surface's lifetime is controlled by the caller. Re-bind the same
/// target whenever its layout changes so the recorded size stays current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTarget {
    /// Opaque surface identifier.
    pub id: RenderTargetId,
    /// Width in physical pixels.
    pub physical_width: u32,
    /// Height in physical pixels.
    pub physical_height: u32,
}

impl RenderTarget {
    #[must_use]
    pub fn new(id: RenderTargetId, physical_width: u32, physical_height: u32) -> Self {
        Self {
            id,
            physical_width,
            physical_height,
        }
    }
}

/// Per-attendee volume-indicator subscriptions offered by the transport.
///
/// The roster holds a subscription for exactly as long as the attendee has
/// a live roster entry.
pub trait RealtimeSubscriptions: Send + Sync {
    /// Start delivering volume/mute/signal updates for `attendee_id`.
    fn subscribe_volume_indicator(&self, attendee_id: &AttendeeId);

    /// Stop delivering updates for `attendee_id`.
    fn unsubscribe_volume_indicator(&self, attendee_id: &AttendeeId);
}
