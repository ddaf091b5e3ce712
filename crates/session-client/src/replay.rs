//! Replay of recorded transport callbacks.
//!
//! A replay script is a JSON document with optional configuration overrides
//! and an ordered list of steps. Each step is sent to a [`SessionActor`] in
//! order, with every observer notification logged, so reordering bugs from
//! field captures can be reproduced locally.
//!
//! ```json
//! {
//!   "env": { "SESSION_MEETING_ID": "m1", "SESSION_ATTENDEE_ID": "local" },
//!   "steps": [
//!     { "type": "presence", "attendeeId": "a", "present": true, "externalUserId": "org#alice" },
//!     { "type": "volume", "attendeeId": "a", "volume": 0.8, "muted": false },
//!     { "type": "addTile" },
//!     { "type": "bindStream", "tileId": 1, "attendeeId": "a", "streamId": "s1" },
//!     { "type": "publish", "name": "meetingStartSucceeded" }
//!   ]
//! }
//! ```

use common::types::{AttendeeId, RenderTargetId, TileId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::actors::{SessionActor, SessionActorHandle};
use crate::config::SessionConfig;
use crate::engine::{Collaborators, SessionEngine};
use crate::errors::{ClientError, ObserverError};
use crate::events::{
    EventAttributes, EventName, EventSpecificAttributes, MeetingHistoryEntry, MeetingHistoryState,
};
use crate::observers::{EventReceiver, SessionObserver};
use crate::roster::{PresenceEvent, RosterEntry, VolumeIndicator};
use crate::tiles::{StreamBinding, TileState};
use crate::transport::{MediaStream, RealtimeSubscriptions, RenderTarget};

/// Log filter used by the replay binary when `RUST_LOG` is unset.
///
/// Component targets are dotted (`session.tiles`, `session.replay`), so the
/// directive is the `session` prefix rather than the crate name.
pub const DEFAULT_LOG_FILTER: &str = "session=debug,session_replay=info";

/// A parsed replay script.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplayScript {
    /// Configuration variables, overriding the process environment.
    #[serde(default)]
    pub env: HashMap<String, String>,
    pub steps: Vec<ReplayStep>,
}

impl ReplayScript {
    pub fn from_json(json: &str) -> Result<Self, ClientError> {
        serde_json::from_str(json).map_err(|e| ClientError::Replay(format!("invalid script: {e}")))
    }
}

/// One recorded callback or application call.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ReplayStep {
    Presence(PresenceEvent),
    Volume(VolumeIndicator),
    #[serde(rename_all = "camelCase")]
    ActiveSpeakers {
        ranked: Vec<AttendeeId>,
    },
    Scores {
        scores: BTreeMap<AttendeeId, f64>,
    },
    AddTile,
    StartLocalTile,
    StopLocalTile,
    RemoveLocalTile,
    #[serde(rename_all = "camelCase")]
    BindStream {
        tile_id: TileId,
        attendee_id: AttendeeId,
        stream_id: String,
        #[serde(default)]
        external_user_id: Option<String>,
        #[serde(default)]
        width: Option<u32>,
        #[serde(default)]
        height: Option<u32>,
    },
    #[serde(rename_all = "camelCase")]
    UnbindStream {
        tile_id: TileId,
    },
    #[serde(rename_all = "camelCase")]
    BindElement {
        tile_id: TileId,
        target_id: u64,
        width: u32,
        height: u32,
    },
    #[serde(rename_all = "camelCase")]
    UnbindElement {
        tile_id: TileId,
    },
    #[serde(rename_all = "camelCase")]
    Pause {
        tile_id: TileId,
    },
    #[serde(rename_all = "camelCase")]
    Unpause {
        tile_id: TileId,
    },
    #[serde(rename_all = "camelCase")]
    MarkPoorConnection {
        tile_id: TileId,
    },
    #[serde(rename_all = "camelCase")]
    UnmarkPoorConnection {
        tile_id: TileId,
    },
    #[serde(rename_all = "camelCase")]
    RemoveTile {
        tile_id: TileId,
    },
    #[serde(rename_all = "camelCase")]
    RemoveAttendeeTiles {
        attendee_id: AttendeeId,
    },
    #[serde(rename_all = "camelCase")]
    PushState {
        state: MeetingHistoryState,
        #[serde(default)]
        timestamp_ms: Option<u64>,
    },
    Publish {
        name: EventName,
        #[serde(default)]
        attributes: Option<EventSpecificAttributes>,
    },
    /// Let wall-clock time pass, e.g. for score flushing.
    Wait {
        ms: u64,
    },
}

/// Final session state after a replay.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaySummary {
    pub steps: usize,
    pub tiles: Vec<TileState>,
    pub roster: Vec<RosterEntry>,
    pub history: Vec<MeetingHistoryEntry>,
}

/// Observer that logs every notification.
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl SessionObserver for LoggingObserver {
    fn video_tile_did_update(
        &self,
        tile_id: TileId,
        previous: Option<&TileState>,
        current: &TileState,
    ) -> Result<(), ObserverError> {
        info!(
            target: "session.replay",
            tile_id = %tile_id,
            added = previous.is_none(),
            active = current.active,
            paused = current.paused,
            poor_connection = current.poor_connection,
            attendee_id = ?current.bound_attendee_id.as_ref().map(AttendeeId::as_str),
            "Tile updated"
        );
        Ok(())
    }

    fn video_tile_was_removed(&self, tile_id: TileId) -> Result<(), ObserverError> {
        info!(target: "session.replay", tile_id = %tile_id, "Tile removed");
        Ok(())
    }

    fn roster_did_update(&self, roster: &[RosterEntry]) -> Result<(), ObserverError> {
        let active = roster.iter().find(|e| e.active).map(|e| e.attendee_id.as_str());
        info!(
            target: "session.replay",
            attendees = roster.len(),
            active_speaker = ?active,
            "Roster updated"
        );
        Ok(())
    }

    fn event_receiver(&self) -> Option<&dyn EventReceiver> {
        Some(self)
    }
}

impl EventReceiver for LoggingObserver {
    fn event_did_receive(
        &self,
        name: EventName,
        attributes: &EventAttributes,
    ) -> Result<(), ObserverError> {
        info!(
            target: "session.replay",
            event = name.as_str(),
            timestamp_ms = attributes.timestamp_ms,
            history_len = attributes.meeting_history.len(),
            "Event received"
        );
        Ok(())
    }
}

/// Stand-in transport: subscriptions are only logged.
#[derive(Debug, Default)]
pub struct LoggingRealtime;

impl RealtimeSubscriptions for LoggingRealtime {
    fn subscribe_volume_indicator(&self, attendee_id: &AttendeeId) {
        debug!(target: "session.replay", attendee_id = %attendee_id, "Indicator subscribed");
    }

    fn unsubscribe_volume_indicator(&self, attendee_id: &AttendeeId) {
        debug!(target: "session.replay", attendee_id = %attendee_id, "Indicator unsubscribed");
    }
}

/// Placeholder for a recorded stream.
#[derive(Debug)]
pub struct ReplayStream {
    id: String,
}

impl ReplayStream {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl MediaStream for ReplayStream {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for ReplayStream {
    fn drop(&mut self) {
        debug!(target: "session.replay", stream_id = %self.id, "Stream released");
    }
}

/// Run a script against a fresh session actor.
///
/// `base_env` is overlaid with the script's own `env` before the
/// configuration is loaded.
pub async fn run_script(
    script: ReplayScript,
    base_env: HashMap<String, String>,
) -> Result<ReplaySummary, ClientError> {
    let mut vars = base_env;
    vars.extend(script.env);
    let config = SessionConfig::from_vars(&vars)?;

    let engine = SessionEngine::new(config, Collaborators::new(Arc::new(LoggingRealtime)));
    let cancel_token = CancellationToken::new();
    let (handle, task) = SessionActor::spawn(engine, cancel_token.clone());
    handle.add_observer(Arc::new(LoggingObserver)).await?;

    let steps = script.steps.len();
    for (index, step) in script.steps.into_iter().enumerate() {
        debug!(target: "session.replay", step = index, "Applying step");
        apply_step(&handle, step).await?;
    }

    let summary = ReplaySummary {
        steps,
        tiles: handle.get_all_video_tiles().await?,
        roster: handle.get_roster().await?,
        history: handle.get_history().await?,
    };

    cancel_token.cancel();
    task.await
        .map_err(|e| ClientError::ActorUnavailable(format!("actor task failed: {e}")))?;

    info!(target: "session.replay", steps, "Replay finished");
    Ok(summary)
}

async fn apply_step(handle: &SessionActorHandle, step: ReplayStep) -> Result<(), ClientError> {
    match step {
        ReplayStep::Presence(event) => handle.presence(event).await,
        ReplayStep::Volume(update) => handle.volume_indicator(update).await,
        ReplayStep::ActiveSpeakers { ranked } => handle.active_speakers(ranked).await,
        ReplayStep::Scores { scores } => handle.speaker_scores(scores).await,
        ReplayStep::AddTile => handle.add_video_tile().await.map(|_| ()),
        ReplayStep::StartLocalTile => handle.start_local_video_tile().await.map(|_| ()),
        ReplayStep::StopLocalTile => handle.stop_local_video_tile().await,
        ReplayStep::RemoveLocalTile => handle.remove_local_video_tile().await,
        ReplayStep::BindStream {
            tile_id,
            attendee_id,
            stream_id,
            external_user_id,
            width,
            height,
        } => {
            let mut binding =
                StreamBinding::new(attendee_id, Box::new(ReplayStream::new(stream_id)));
            if let Some(external_user_id) = external_user_id {
                binding = binding.with_external_user_id(external_user_id);
            }
            if let (Some(width), Some(height)) = (width, height) {
                binding = binding.with_content_size(width, height);
            }
            handle.bind_video_stream(tile_id, binding).await
        }
        ReplayStep::UnbindStream { tile_id } => handle.unbind_video_stream(tile_id).await,
        ReplayStep::BindElement {
            tile_id,
            target_id,
            width,
            height,
        } => {
            let target = RenderTarget::new(RenderTargetId(target_id), width, height);
            handle.bind_video_element(tile_id, target).await
        }
        ReplayStep::UnbindElement { tile_id } => handle.unbind_video_element(tile_id).await,
        ReplayStep::Pause { tile_id } => handle.pause_video_tile(tile_id).await,
        ReplayStep::Unpause { tile_id } => handle.unpause_video_tile(tile_id).await,
        ReplayStep::MarkPoorConnection { tile_id } => {
            handle.mark_poor_connection(tile_id).await.map(|_| ())
        }
        ReplayStep::UnmarkPoorConnection { tile_id } => {
            handle.unmark_poor_connection(tile_id).await.map(|_| ())
        }
        ReplayStep::RemoveTile { tile_id } => handle.remove_video_tile(tile_id).await,
        ReplayStep::RemoveAttendeeTiles { attendee_id } => handle
            .remove_video_tiles_by_attendee_id(attendee_id)
            .await
            .map(|_| ()),
        ReplayStep::PushState {
            state,
            timestamp_ms,
        } => handle.push_meeting_state(state, timestamp_ms).await,
        ReplayStep::Publish { name, attributes } => {
            handle.publish_event(name, attributes).await.map(|_| ())
        }
        ReplayStep::Wait { ms } => {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn base_env() -> HashMap<String, String> {
        HashMap::from([
            ("SESSION_MEETING_ID".to_string(), "m1".to_string()),
            ("SESSION_ATTENDEE_ID".to_string(), "local".to_string()),
        ])
    }

    #[test]
    fn test_default_log_filter_enables_component_targets() {
        use tracing::Level;
        use tracing_subscriber::layer::SubscriberExt;

        let subscriber = tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(target: "session.replay", Level::INFO));
            assert!(tracing::enabled!(target: "session.tiles", Level::DEBUG));
            assert!(tracing::enabled!(target: "session.observers", Level::DEBUG));
            assert!(tracing::enabled!(target: "session_replay", Level::INFO));
            assert!(!tracing::enabled!(target: "session_replay", Level::DEBUG));
            assert!(!tracing::enabled!(target: "hyper", Level::INFO));
        });
    }

    #[test]
    fn test_parse_script_steps() {
        let script = ReplayScript::from_json(
            r#"{
                "steps": [
                    {"type": "presence", "attendeeId": "a", "present": true, "externalUserId": "x#a"},
                    {"type": "volume", "attendeeId": "a", "volume": 0.5},
                    {"type": "activeSpeakers", "ranked": ["a"]},
                    {"type": "bindElement", "tileId": 1, "targetId": 9, "width": 640, "height": 360},
                    {"type": "pushState", "state": "connecting"},
                    {"type": "publish", "name": "meetingEnded", "attributes": {"meetingDurationMs": 5}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(script.steps.len(), 6);
        assert!(script.env.is_empty());
        assert!(matches!(
            &script.steps[3],
            ReplayStep::BindElement { tile_id, target_id: 9, .. } if *tile_id == TileId(1)
        ));
    }

    #[test]
    fn test_invalid_script_is_replay_error() {
        let err = ReplayScript::from_json(r#"{"steps": [{"type": "teleport"}]}"#).unwrap_err();
        assert!(matches!(err, ClientError::Replay(_)));
    }

    #[tokio::test]
    async fn test_replay_reproduces_late_indicator() {
        let script = ReplayScript::from_json(
            r#"{
                "steps": [
                    {"type": "presence", "attendeeId": "a", "present": true, "externalUserId": "org#alice"},
                    {"type": "volume", "attendeeId": "a", "volume": 0.8, "muted": false, "signalStrength": 0.9},
                    {"type": "presence", "attendeeId": "a", "present": false, "externalUserId": "org#alice"},
                    {"type": "volume", "attendeeId": "a", "volume": 0.1},
                    {"type": "addTile"},
                    {"type": "bindStream", "tileId": 1, "attendeeId": "b", "streamId": "s1"},
                    {"type": "publish", "name": "meetingStartSucceeded"}
                ]
            }"#,
        )
        .unwrap();

        let summary = run_script(script, base_env()).await.unwrap();

        assert_eq!(summary.steps, 7);
        assert!(summary.roster.is_empty());
        assert_eq!(summary.tiles.len(), 1);
        assert_eq!(summary.tiles[0].bound_stream_id.as_deref(), Some("s1"));
        assert_eq!(summary.history.len(), 1);
    }

    #[tokio::test]
    async fn test_replay_without_required_config_fails() {
        let script = ReplayScript::default();
        let err = run_script(script, HashMap::new()).await.unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
