//! Roster aggregation.
//!
//! Merges three independent push sources into one record per attendee:
//! presence, per-attendee volume indicators, and active-speaker ranking.
//! Indicator updates for attendees without a live entry (arrived before
//! presence, or after departure) are discarded.

pub mod aggregator;
pub mod entry;

pub use aggregator::RosterAggregator;
pub use entry::{
    derive_display_name, AttendeeStatus, PresenceEvent, RosterEntry, VolumeIndicator,
    CONTENT_NAME_SUFFIX,
};
