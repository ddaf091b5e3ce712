//! Metrics definitions for the session client
//!
//! All metrics follow Prometheus naming conventions:
//! - `session_` prefix
//! - `_total` suffix for counters
//!
//! Recording goes through the `metrics` facade; the embedding application
//! decides which recorder (if any) is installed.

use metrics::{counter, gauge};

// ============================================================================
// Registry & Roster Metrics (Gauges)
// ============================================================================

/// Set the number of tiles currently in the registry.
///
/// Metric: `session_tiles_active`
/// Labels: none
pub fn set_tiles_active(count: usize) {
    // usize to f64 conversion is safe for realistic tile counts (< 2^53)
    #[allow(clippy::cast_precision_loss)]
    gauge!("session_tiles_active").set(count as f64);
}

/// Set the number of attendees currently on the roster.
///
/// Metric: `session_roster_size`
/// Labels: none
pub fn set_roster_size(count: usize) {
    #[allow(clippy::cast_precision_loss)]
    gauge!("session_roster_size").set(count as f64);
}

// ============================================================================
// Counters
// ============================================================================

/// Record a volume indicator that was discarded.
///
/// Metric: `session_indicator_dropped_total`
/// Labels: `reason`
///
/// Reasons:
/// - `no_entry`: indicator for an attendee without a roster entry (reordering)
pub fn record_indicator_dropped(reason: &'static str) {
    counter!("session_indicator_dropped_total", "reason" => reason).increment(1);
}

/// Record an attendee departure caused by the transport dropping them.
///
/// Metric: `session_attendee_dropped_total`
pub fn record_attendee_dropped() {
    counter!("session_attendee_dropped_total").increment(1);
}

/// Record an observer callback that failed or panicked.
///
/// Metric: `session_observer_failures_total`
/// Labels: `observer_kind` (tile, roster, event)
pub fn record_observer_failure(observer_kind: &'static str) {
    counter!("session_observer_failures_total", "observer_kind" => observer_kind).increment(1);
}

/// Record a published analytics event.
///
/// Metric: `session_events_published_total`
/// Labels: `event`
///
/// Cardinality: bounded by the `EventName` enum (~10 values)
pub fn record_event_published(event: &'static str) {
    counter!("session_events_published_total", "event" => event).increment(1);
}
