//! `EventTracker` - meeting history log and event stamping.

use common::clock::Clock;
use common::types::AttendeeId;
use std::sync::Arc;
use tracing::{debug, warn};

use super::attributes::{EnvironmentSnapshot, EventAttributes, EventSpecificAttributes};
use super::history::{EventName, MeetingHistoryEntry, MeetingHistoryState};
use super::{SDK_NAME, SDK_VERSION};
use crate::config::SessionConfig;
use crate::observability::metrics::record_event_published;
use crate::observers::{DispatchReport, ObserverSet};

/// Append-only meeting history plus the attribute snapshot used to stamp
/// published events.
pub struct EventTracker {
    attendee_id: AttendeeId,
    external_user_id: String,
    meeting_id: String,
    external_meeting_id: String,
    environment: EnvironmentSnapshot,
    history: Vec<MeetingHistoryEntry>,
    clock: Arc<dyn Clock>,
}

impl EventTracker {
    #[must_use]
    pub fn new(
        config: &SessionConfig,
        environment: EnvironmentSnapshot,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            attendee_id: config.attendee_id.clone(),
            external_user_id: config.external_user_id.clone(),
            meeting_id: config.meeting_id.clone(),
            external_meeting_id: config.external_meeting_id.clone(),
            environment,
            history: Vec::new(),
            clock,
        }
    }

    /// Append a state. `timestamp_ms` defaults to the current clock reading.
    pub fn push_meeting_state(&mut self, state: MeetingHistoryState, timestamp_ms: Option<u64>) {
        let timestamp_ms = timestamp_ms.unwrap_or_else(|| self.clock.now_ms());
        if let Some(last) = self.history.last() {
            if timestamp_ms < last.timestamp_ms {
                warn!(
                    target: "session.events",
                    state = ?state,
                    timestamp_ms,
                    last_timestamp_ms = last.timestamp_ms,
                    "Meeting state pushed with an earlier timestamp than the last entry"
                );
            }
        }
        debug!(target: "session.events", state = ?state, timestamp_ms, "Meeting state pushed");
        self.history.push(MeetingHistoryEntry {
            state,
            timestamp_ms,
        });
    }

    /// Stamp an event, append it to the history, and deliver it to every
    /// observer with the event-reception capability.
    pub fn publish_event(
        &mut self,
        name: EventName,
        attributes: Option<EventSpecificAttributes>,
        observers: &ObserverSet,
    ) -> DispatchReport {
        let timestamp_ms = self.clock.now_ms();
        self.push_meeting_state(name.into(), Some(timestamp_ms));

        let mut merged = self.attributes(timestamp_ms);
        if let Some(attributes) = attributes {
            merged = merged.merged(attributes);
        }

        record_event_published(name.as_str());
        let report = observers.event_received(name, &merged);
        debug!(
            target: "session.events",
            event = name.as_str(),
            delivered = report.delivered,
            skipped = report.skipped,
            failed = report.failed,
            "Event published"
        );
        report
    }

    /// Base attributes for an event stamped at `timestamp_ms`.
    #[must_use]
    pub fn attributes(&self, timestamp_ms: u64) -> EventAttributes {
        EventAttributes {
            attendee_id: self.attendee_id.clone(),
            external_user_id: self.external_user_id.clone(),
            meeting_id: self.meeting_id.clone(),
            external_meeting_id: self.external_meeting_id.clone(),
            meeting_history: self.history.clone(),
            sdk_name: SDK_NAME.to_string(),
            sdk_version: SDK_VERSION.to_string(),
            timestamp_ms,
            environment: self.environment.clone(),
            details: EventSpecificAttributes::default(),
        }
    }

    #[must_use]
    pub fn history(&self) -> &[MeetingHistoryEntry] {
        &self.history
    }

    #[must_use]
    pub fn environment(&self) -> &EnvironmentSnapshot {
        &self.environment
    }
}
