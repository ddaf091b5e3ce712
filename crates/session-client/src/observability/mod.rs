//! Observability module for the session client
//!
//! Metrics are recorded through the `metrics` facade.
//!
//! # Privacy by Default
//!
//! Attendee and tile ids never appear as metric labels. Labels are bounded
//! to prevent cardinality explosion:
//! - `reason`: bounded drop reasons (`no_entry`, `dropped`)
//! - `observer_kind`: 3 values (tile, roster, event)
//! - `event`: bounded by the `EventName` enum
//!
//! # Metrics
//!
//! | Metric | Type | Labels | Purpose |
//! |--------|------|--------|---------|
//! | `session_tiles_active` | Gauge | none | Tiles currently in the registry |
//! | `session_roster_size` | Gauge | none | Attendees currently on the roster |
//! | `session_indicator_dropped_total` | Counter | `reason` | Discarded volume indicators |
//! | `session_attendee_dropped_total` | Counter | none | Departures caused by a transport drop |
//! | `session_observer_failures_total` | Counter | `observer_kind` | Isolated observer callback failures |
//! | `session_events_published_total` | Counter | `event` | Published analytics events |

pub mod metrics;

// Re-exports for convenience
pub use metrics::{
    record_attendee_dropped, record_event_published, record_indicator_dropped,
    record_observer_failure, set_roster_size, set_tiles_active,
};
