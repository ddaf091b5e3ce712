//! Meeting history and analytics event publication.
//!
//! The [`EventTracker`] keeps an append-only log of session states and
//! stamps every published event with the environment snapshot, the session
//! identity and the full history so far. Event-specific attributes are
//! overlaid last and win on collision.

pub mod attributes;
pub mod history;
pub mod tracker;

pub use attributes::{EnvironmentSnapshot, EventAttributes, EventSpecificAttributes, UNAVAILABLE};
pub use history::{EventName, MeetingHistoryEntry, MeetingHistoryState};
pub use tracker::EventTracker;

/// Reported as `sdkName` on every event.
pub const SDK_NAME: &str = env!("CARGO_PKG_NAME");

/// Reported as `sdkVersion` on every event.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
