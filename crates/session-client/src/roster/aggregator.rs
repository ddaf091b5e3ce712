//! `RosterAggregator` - merges presence, indicator and speaker callbacks.

use common::clock::Clock;
use common::types::AttendeeId;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, trace};

use super::entry::{PresenceEvent, RosterEntry, VolumeIndicator};
use crate::observability::metrics::{
    record_attendee_dropped, record_indicator_dropped, set_roster_size,
};
use crate::observers::ObserverSet;
use crate::speaker::{ActiveSpeakerDetector, SpeakerUpdate};
use crate::transport::RealtimeSubscriptions;

/// Per-attendee roster for one call.
///
/// Entries exist only between an attendee's presence-present and
/// presence-absent events; the volume-indicator subscription has exactly
/// the same lifetime. Every accepted mutation re-renders the full view to
/// roster observers.
pub struct RosterAggregator {
    entries: BTreeMap<AttendeeId, RosterEntry>,
    realtime: Arc<dyn RealtimeSubscriptions>,
    detector: ActiveSpeakerDetector,
    clock: Arc<dyn Clock>,
}

impl RosterAggregator {
    #[must_use]
    pub fn new(
        realtime: Arc<dyn RealtimeSubscriptions>,
        detector: ActiveSpeakerDetector,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            entries: BTreeMap::new(),
            realtime,
            detector,
            clock,
        }
    }

    /// Apply a presence callback. Returns `true` if the roster changed.
    pub fn on_presence(&mut self, event: &PresenceEvent, observers: &ObserverSet) -> bool {
        let changed = if event.present {
            self.attendee_joined(event)
        } else {
            self.attendee_left(event)
        };
        if changed {
            self.render(observers);
        }
        changed
    }

    fn attendee_joined(&mut self, event: &PresenceEvent) -> bool {
        if self.entries.contains_key(&event.attendee_id) {
            debug!(
                target: "session.roster",
                attendee_id = %event.attendee_id,
                "Duplicate presence ignored"
            );
            return false;
        }

        let entry = RosterEntry::new(event.attendee_id.clone(), &event.external_user_id);
        info!(
            target: "session.roster",
            attendee_id = %event.attendee_id,
            display_name = %entry.display_name,
            "Attendee joined"
        );
        self.realtime.subscribe_volume_indicator(&event.attendee_id);
        self.entries.insert(event.attendee_id.clone(), entry);
        true
    }

    fn attendee_left(&mut self, event: &PresenceEvent) -> bool {
        if self.entries.remove(&event.attendee_id).is_none() {
            debug!(
                target: "session.roster",
                attendee_id = %event.attendee_id,
                "Departure for unknown attendee ignored"
            );
            return false;
        }

        self.realtime.unsubscribe_volume_indicator(&event.attendee_id);
        if event.dropped {
            record_attendee_dropped();
        }
        info!(
            target: "session.roster",
            attendee_id = %event.attendee_id,
            dropped = event.dropped,
            "Attendee left"
        );

        if let Some(ranked) = self.detector.remove_attendee(&event.attendee_id) {
            self.apply_active_speakers(&ranked);
        }
        true
    }

    /// Apply a volume-indicator callback.
    ///
    /// Updates for attendees without a live entry are discarded. Samples
    /// carrying volume or mute are also fed to the speaker detector.
    pub fn on_volume_indicator(&mut self, update: &VolumeIndicator, observers: &ObserverSet) {
        let Some(entry) = self.entries.get_mut(&update.attendee_id) else {
            trace!(
                target: "session.roster",
                attendee_id = %update.attendee_id,
                "Indicator without roster entry discarded"
            );
            record_indicator_dropped("no_entry");
            return;
        };
        entry.apply_indicator(update);

        if update.volume.is_some() || update.muted.is_some() {
            let now_ms = self.clock.now_ms();
            let speaker_update =
                self.detector
                    .observe(&update.attendee_id, update.volume, update.muted, now_ms);
            self.apply_speaker_update(&speaker_update);
        }

        self.render(observers);
    }

    /// Apply an externally ranked active-speaker list, most active first.
    pub fn on_active_speakers(&mut self, ranked: &[AttendeeId], observers: &ObserverSet) {
        self.apply_active_speakers(ranked);
        self.render(observers);
    }

    /// Merge a score map into the entries it names.
    pub fn on_speaker_scores(
        &mut self,
        scores: &BTreeMap<AttendeeId, f64>,
        observers: &ObserverSet,
    ) {
        self.merge_scores(scores);
        self.render(observers);
    }

    /// Flush detector scores if the reporting interval elapsed.
    /// Returns `true` if scores were merged.
    pub fn tick_scores(&mut self, observers: &ObserverSet) -> bool {
        let now_ms = self.clock.now_ms();
        let Some(scores) = self.detector.tick(now_ms) else {
            return false;
        };
        self.merge_scores(&scores);
        self.render(observers);
        true
    }

    /// Merge the current detector scores regardless of the interval.
    /// Used by a timer that already enforces the cadence.
    pub fn flush_scores(&mut self, observers: &ObserverSet) -> bool {
        let now_ms = self.clock.now_ms();
        let Some(scores) = self.detector.flush(now_ms) else {
            return false;
        };
        self.merge_scores(&scores);
        self.render(observers);
        true
    }

    /// Drop every entry and subscription, e.g. when leaving the call.
    pub fn clear(&mut self, observers: &ObserverSet) {
        for attendee_id in self.entries.keys() {
            self.realtime.unsubscribe_volume_indicator(attendee_id);
        }
        let removed = self.entries.len();
        self.entries.clear();
        self.detector.reset();

        debug!(target: "session.roster", removed, "Roster cleared");
        self.render(observers);
    }

    #[must_use]
    pub fn get(&self, attendee_id: &AttendeeId) -> Option<&RosterEntry> {
        self.entries.get(attendee_id)
    }

    #[must_use]
    pub fn contains(&self, attendee_id: &AttendeeId) -> bool {
        self.entries.contains_key(attendee_id)
    }

    /// Full roster view, ordered by attendee id.
    #[must_use]
    pub fn view(&self) -> Vec<RosterEntry> {
        self.entries.values().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn detector(&self) -> &ActiveSpeakerDetector {
        &self.detector
    }

    fn apply_speaker_update(&mut self, update: &SpeakerUpdate) {
        if let Some(ranked) = &update.active_speakers {
            self.apply_active_speakers(ranked);
        }
        if let Some(scores) = &update.scores {
            self.merge_scores(scores);
        }
    }

    /// Highlight the first ranked attendee that has an entry; clear the rest.
    fn apply_active_speakers(&mut self, ranked: &[AttendeeId]) {
        let top = ranked.iter().find(|id| self.entries.contains_key(*id));
        for (attendee_id, entry) in &mut self.entries {
            entry.active = top == Some(attendee_id);
        }
        trace!(
            target: "session.roster",
            top = ?top.map(AttendeeId::as_str),
            "Active speaker applied"
        );
    }

    fn merge_scores(&mut self, scores: &BTreeMap<AttendeeId, f64>) {
        for (attendee_id, score) in scores {
            if let Some(entry) = self.entries.get_mut(attendee_id) {
                entry.score = Some(*score);
            }
        }
    }

    fn render(&self, observers: &ObserverSet) {
        let view = self.view();
        set_roster_size(view.len());
        observers.roster_updated(&view);
    }
}
