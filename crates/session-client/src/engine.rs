//! `SessionEngine` - synchronous composition of every session component.
//!
//! The engine is the single mutator of session state. It owns the tile
//! registry, the roster, the event tracker and the observer collection, and
//! lends the observers to each component as it mutates. It performs no I/O
//! and never blocks; the session actor drives it from one task.

use common::clock::{Clock, SystemClock};
use common::types::{AttendeeId, TileId};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::config::SessionConfig;
use crate::events::{
    EventName, EventSpecificAttributes, EventTracker, MeetingHistoryEntry, MeetingHistoryState,
};
use crate::observers::{DispatchReport, ObserverHandle, ObserverSet, SessionObserver};
use crate::roster::{PresenceEvent, RosterAggregator, RosterEntry, VolumeIndicator};
use crate::speaker::{ActiveSpeakerDetector, ActiveSpeakerPolicy, DefaultActiveSpeakerPolicy};
use crate::system_info::{capture_snapshot, EnvironmentProbe, SystemProbe};
use crate::tiles::{StreamBinding, TileRegistry, TileState};
use crate::transport::{RealtimeSubscriptions, RenderTarget};

/// External collaborators the engine calls into.
pub struct Collaborators {
    pub realtime: Arc<dyn RealtimeSubscriptions>,
    pub clock: Arc<dyn Clock>,
    pub probe: Box<dyn EnvironmentProbe>,
    pub policy: Box<dyn ActiveSpeakerPolicy>,
}

impl Collaborators {
    /// Production defaults: system clock, `sysinfo` probe and the default
    /// speaker policy.
    #[must_use]
    pub fn new(realtime: Arc<dyn RealtimeSubscriptions>) -> Self {
        Self {
            realtime,
            clock: Arc::new(SystemClock::new()),
            probe: Box::new(SystemProbe),
            policy: Box::new(DefaultActiveSpeakerPolicy::default()),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_probe(mut self, probe: Box<dyn EnvironmentProbe>) -> Self {
        self.probe = probe;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: Box<dyn ActiveSpeakerPolicy>) -> Self {
        self.policy = policy;
        self
    }
}

/// All state of one call session.
pub struct SessionEngine {
    config: SessionConfig,
    tiles: TileRegistry,
    roster: RosterAggregator,
    events: EventTracker,
    observers: ObserverSet,
}

impl SessionEngine {
    /// Build the engine. Captures the environment snapshot once; a failing
    /// probe degrades to sentinel values and never fails construction.
    #[must_use]
    pub fn new(config: SessionConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            realtime,
            clock,
            probe,
            policy,
        } = collaborators;

        let environment = capture_snapshot(
            probe.as_ref(),
            config.agent_name.as_deref(),
            config.agent_version.as_deref(),
        );
        let detector = ActiveSpeakerDetector::new(policy, config.speaker_score_interval_ms);
        let roster = RosterAggregator::new(realtime, detector, Arc::clone(&clock));
        let events = EventTracker::new(&config, environment, clock);

        info!(
            target: "session.engine",
            meeting_id = %config.meeting_id,
            attendee_id = %config.attendee_id,
            prioritize_speaker_bandwidth = roster
                .detector()
                .policy()
                .prioritize_video_send_bandwidth_for_active_speaker(),
            "Session engine created"
        );

        Self {
            config,
            tiles: TileRegistry::new(),
            roster,
            events,
            observers: ObserverSet::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn tiles(&self) -> &TileRegistry {
        &self.tiles
    }

    /// Whether the installed speaker policy wants video send bandwidth
    /// steered towards the active speaker.
    #[must_use]
    pub fn prioritizes_active_speaker_bandwidth(&self) -> bool {
        self.roster
            .detector()
            .policy()
            .prioritize_video_send_bandwidth_for_active_speaker()
    }

    #[must_use]
    pub fn roster(&self) -> &RosterAggregator {
        &self.roster
    }

    #[must_use]
    pub fn events(&self) -> &EventTracker {
        &self.events
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    pub fn add_observer(&mut self, observer: Arc<dyn SessionObserver>) -> ObserverHandle {
        self.observers.add(observer)
    }

    pub fn remove_observer(&mut self, handle: ObserverHandle) -> bool {
        self.observers.remove(handle)
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    // ------------------------------------------------------------------
    // Tiles
    // ------------------------------------------------------------------

    pub fn add_video_tile(&mut self) -> TileId {
        self.tiles.add_video_tile(&self.observers)
    }

    pub fn start_local_video_tile(&mut self) -> TileId {
        self.tiles.start_local_video_tile(&self.observers)
    }

    pub fn stop_local_video_tile(&mut self) {
        self.tiles.stop_local_video_tile(&self.observers);
    }

    pub fn remove_local_video_tile(&mut self) {
        self.tiles.remove_local_video_tile(&self.observers);
    }

    pub fn bind_video_stream(&mut self, tile_id: TileId, binding: StreamBinding) {
        self.tiles.bind_video_stream(tile_id, binding, &self.observers);
    }

    pub fn unbind_video_stream(&mut self, tile_id: TileId) {
        self.tiles.unbind_video_stream(tile_id, &self.observers);
    }

    pub fn bind_video_element(&mut self, tile_id: TileId, target: RenderTarget) {
        self.tiles.bind_video_element(tile_id, target, &self.observers);
    }

    pub fn unbind_video_element(&mut self, tile_id: TileId) {
        self.tiles.unbind_video_element(tile_id, &self.observers);
    }

    pub fn pause_video_tile(&mut self, tile_id: TileId) {
        self.tiles.pause_video_tile(tile_id, &self.observers);
    }

    pub fn unpause_video_tile(&mut self, tile_id: TileId) {
        self.tiles.unpause_video_tile(tile_id, &self.observers);
    }

    pub fn mark_poor_connection(&mut self, tile_id: TileId) -> bool {
        self.tiles.mark_poor_connection(tile_id, &self.observers)
    }

    pub fn unmark_poor_connection(&mut self, tile_id: TileId) -> bool {
        self.tiles.unmark_poor_connection(tile_id, &self.observers)
    }

    pub fn remove_video_tile(&mut self, tile_id: TileId) {
        self.tiles.remove_video_tile(tile_id, &self.observers);
    }

    pub fn remove_video_tiles_by_attendee_id(&mut self, attendee_id: &AttendeeId) -> Vec<TileId> {
        self.tiles
            .remove_video_tiles_by_attendee_id(attendee_id, &self.observers)
    }

    pub fn remove_all_video_tiles(&mut self) {
        self.tiles.remove_all_video_tiles(&self.observers);
    }

    pub fn send_tile_state_update(&self, tile_id: TileId) {
        self.tiles.send_tile_state_update(tile_id, &self.observers);
    }

    #[must_use]
    pub fn get_video_tile(&self, tile_id: TileId) -> Option<&TileState> {
        self.tiles.get_video_tile(tile_id)
    }

    // ------------------------------------------------------------------
    // Roster
    // ------------------------------------------------------------------

    pub fn on_presence(&mut self, event: &PresenceEvent) -> bool {
        self.roster.on_presence(event, &self.observers)
    }

    pub fn on_volume_indicator(&mut self, update: &VolumeIndicator) {
        self.roster.on_volume_indicator(update, &self.observers);
    }

    pub fn on_active_speakers(&mut self, ranked: &[AttendeeId]) {
        self.roster.on_active_speakers(ranked, &self.observers);
    }

    pub fn on_speaker_scores(&mut self, scores: &BTreeMap<AttendeeId, f64>) {
        self.roster.on_speaker_scores(scores, &self.observers);
    }

    pub fn tick_scores(&mut self) -> bool {
        self.roster.tick_scores(&self.observers)
    }

    pub fn flush_scores(&mut self) -> bool {
        self.roster.flush_scores(&self.observers)
    }

    pub fn clear_roster(&mut self) {
        self.roster.clear(&self.observers);
    }

    #[must_use]
    pub fn roster_view(&self) -> Vec<RosterEntry> {
        self.roster.view()
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub fn push_meeting_state(&mut self, state: MeetingHistoryState, timestamp_ms: Option<u64>) {
        self.events.push_meeting_state(state, timestamp_ms);
    }

    pub fn publish_event(
        &mut self,
        name: EventName,
        attributes: Option<EventSpecificAttributes>,
    ) -> DispatchReport {
        self.events.publish_event(name, attributes, &self.observers)
    }

    #[must_use]
    pub fn history(&self) -> &[MeetingHistoryEntry] {
        self.events.history()
    }

    /// Leave the call: release every subscription and stream.
    pub fn shutdown(&mut self) {
        self.roster.clear(&self.observers);
        self.tiles.remove_all_video_tiles(&self.observers);
        info!(
            target: "session.engine",
            meeting_id = %self.config.meeting_id,
            "Session engine shut down"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::errors::ObserverError;
    use crate::transport::MediaStream;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Subscriptions(Mutex<Vec<String>>);

    impl RealtimeSubscriptions for Subscriptions {
        fn subscribe_volume_indicator(&self, attendee_id: &AttendeeId) {
            self.0.lock().unwrap().push(attendee_id.to_string());
        }

        fn unsubscribe_volume_indicator(&self, attendee_id: &AttendeeId) {
            self.0.lock().unwrap().retain(|a| a != attendee_id.as_str());
        }
    }

    #[derive(Debug)]
    struct Stream;

    impl MediaStream for Stream {
        fn id(&self) -> &str {
            "stream"
        }
    }

    #[derive(Default)]
    struct Log(Mutex<Vec<String>>);

    impl SessionObserver for Log {
        fn video_tile_did_update(
            &self,
            tile_id: TileId,
            _previous: Option<&TileState>,
            _current: &TileState,
        ) -> Result<(), ObserverError> {
            self.0.lock().unwrap().push(format!("tile {tile_id}"));
            Ok(())
        }

        fn video_tile_was_removed(&self, tile_id: TileId) -> Result<(), ObserverError> {
            self.0.lock().unwrap().push(format!("removed {tile_id}"));
            Ok(())
        }

        fn roster_did_update(&self, roster: &[RosterEntry]) -> Result<(), ObserverError> {
            self.0.lock().unwrap().push(format!("roster {}", roster.len()));
            Ok(())
        }
    }

    fn engine(subscriptions: Arc<Subscriptions>) -> SessionEngine {
        let vars: HashMap<String, String> = [
            ("SESSION_MEETING_ID", "m1"),
            ("SESSION_ATTENDEE_ID", "local"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        SessionEngine::new(
            SessionConfig::from_vars(&vars).unwrap(),
            Collaborators::new(subscriptions),
        )
    }

    #[test]
    fn test_observers_see_changes_in_order() {
        let mut engine = engine(Arc::new(Subscriptions::default()));
        let log = Arc::new(Log::default());
        engine.add_observer(log.clone());

        let tile = engine.add_video_tile();
        engine.on_presence(&PresenceEvent {
            attendee_id: AttendeeId::new("a"),
            present: true,
            external_user_id: "a".to_string(),
            dropped: false,
        });
        engine.remove_video_tile(tile);

        assert_eq!(
            *log.0.lock().unwrap(),
            vec![
                format!("tile {tile}"),
                "roster 1".to_string(),
                format!("removed {tile}"),
            ]
        );
    }

    #[test]
    fn test_removed_observer_is_not_notified() {
        let mut engine = engine(Arc::new(Subscriptions::default()));
        let log = Arc::new(Log::default());
        let handle = engine.add_observer(log.clone());

        assert!(engine.remove_observer(handle));
        engine.add_video_tile();

        assert!(log.0.lock().unwrap().is_empty());
        assert_eq!(engine.observer_count(), 0);
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let subscriptions = Arc::new(Subscriptions::default());
        let mut engine = engine(subscriptions.clone());
        engine.on_presence(&PresenceEvent {
            attendee_id: AttendeeId::new("a"),
            present: true,
            external_user_id: "a".to_string(),
            dropped: false,
        });
        let tile = engine.add_video_tile();
        engine.bind_video_stream(tile, StreamBinding::new(AttendeeId::new("a"), Box::new(Stream)));

        engine.shutdown();

        assert!(engine.roster().is_empty());
        assert!(engine.tiles().is_empty());
        assert!(subscriptions.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_publish_event_records_history() {
        let mut engine = engine(Arc::new(Subscriptions::default()));
        engine.push_meeting_state(MeetingHistoryState::Connecting, None);
        engine.publish_event(EventName::MeetingStartRequested, None);

        let states: Vec<MeetingHistoryState> = engine.history().iter().map(|e| e.state).collect();
        assert_eq!(
            states,
            vec![
                MeetingHistoryState::Connecting,
                MeetingHistoryState::MeetingStartRequested
            ]
        );
    }

    struct Quiet;

    impl ActiveSpeakerPolicy for Quiet {
        fn calculate_score(
            &mut self,
            _attendee_id: &AttendeeId,
            _volume: Option<f64>,
            _muted: Option<bool>,
        ) -> f64 {
            0.0
        }

        fn prioritize_video_send_bandwidth_for_active_speaker(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_bandwidth_priority_follows_installed_policy() {
        let subscriptions = Arc::new(Subscriptions::default());
        assert!(engine(subscriptions.clone()).prioritizes_active_speaker_bandwidth());

        let vars: HashMap<String, String> = [
            ("SESSION_MEETING_ID", "m1"),
            ("SESSION_ATTENDEE_ID", "local"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let quiet = SessionEngine::new(
            SessionConfig::from_vars(&vars).unwrap(),
            Collaborators::new(subscriptions).with_policy(Box::new(Quiet)),
        );
        assert!(!quiet.prioritizes_active_speaker_bandwidth());
    }
}
