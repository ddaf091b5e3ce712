//! `SessionActor` - owns the session engine on one task.
//!
//! Each `SessionActor`:
//! - Owns the [`SessionEngine`] for one call
//! - Applies mailbox messages strictly in arrival order
//! - Flushes active-speaker scores on a timer when scoring is enabled
//! - Releases every subscription and stream on shutdown

use common::types::{AttendeeId, TileId};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use super::messages::SessionMessage;
use crate::engine::SessionEngine;
use crate::errors::ClientError;
use crate::events::{EventName, EventSpecificAttributes, MeetingHistoryEntry, MeetingHistoryState};
use crate::observers::{DispatchReport, ObserverHandle, SessionObserver};
use crate::roster::{PresenceEvent, RosterEntry, VolumeIndicator};
use crate::tiles::{StreamBinding, TileState};
use crate::transport::RenderTarget;

/// Handle to a `SessionActor`.
#[derive(Clone)]
pub struct SessionActorHandle {
    sender: mpsc::Sender<SessionMessage>,
    cancel_token: CancellationToken,
    meeting_id: String,
}

impl SessionActorHandle {
    #[must_use]
    pub fn meeting_id(&self) -> &str {
        &self.meeting_id
    }

    async fn send(&self, message: SessionMessage) -> Result<(), ClientError> {
        self.sender
            .send(message)
            .await
            .map_err(|e| ClientError::ActorUnavailable(format!("channel send failed: {e}")))
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SessionMessage,
    ) -> Result<T, ClientError> {
        let (tx, rx) = oneshot::channel();
        self.send(build(tx)).await?;
        rx.await
            .map_err(|e| ClientError::ActorUnavailable(format!("response receive failed: {e}")))
    }

    // Observers

    pub async fn add_observer(
        &self,
        observer: Arc<dyn SessionObserver>,
    ) -> Result<ObserverHandle, ClientError> {
        self.request(|respond_to| SessionMessage::AddObserver {
            observer,
            respond_to,
        })
        .await
    }

    pub async fn remove_observer(&self, handle: ObserverHandle) -> Result<bool, ClientError> {
        self.request(|respond_to| SessionMessage::RemoveObserver { handle, respond_to })
            .await
    }

    // Tiles

    pub async fn add_video_tile(&self) -> Result<TileId, ClientError> {
        self.request(|respond_to| SessionMessage::AddVideoTile { respond_to })
            .await
    }

    pub async fn start_local_video_tile(&self) -> Result<TileId, ClientError> {
        self.request(|respond_to| SessionMessage::StartLocalVideoTile { respond_to })
            .await
    }

    pub async fn stop_local_video_tile(&self) -> Result<(), ClientError> {
        self.send(SessionMessage::StopLocalVideoTile).await
    }

    pub async fn remove_local_video_tile(&self) -> Result<(), ClientError> {
        self.send(SessionMessage::RemoveLocalVideoTile).await
    }

    pub async fn bind_video_stream(
        &self,
        tile_id: TileId,
        binding: StreamBinding,
    ) -> Result<(), ClientError> {
        self.send(SessionMessage::BindVideoStream { tile_id, binding })
            .await
    }

    pub async fn unbind_video_stream(&self, tile_id: TileId) -> Result<(), ClientError> {
        self.send(SessionMessage::UnbindVideoStream { tile_id }).await
    }

    pub async fn bind_video_element(
        &self,
        tile_id: TileId,
        target: RenderTarget,
    ) -> Result<(), ClientError> {
        self.send(SessionMessage::BindVideoElement { tile_id, target })
            .await
    }

    pub async fn unbind_video_element(&self, tile_id: TileId) -> Result<(), ClientError> {
        self.send(SessionMessage::UnbindVideoElement { tile_id }).await
    }

    pub async fn pause_video_tile(&self, tile_id: TileId) -> Result<(), ClientError> {
        self.send(SessionMessage::PauseVideoTile { tile_id }).await
    }

    pub async fn unpause_video_tile(&self, tile_id: TileId) -> Result<(), ClientError> {
        self.send(SessionMessage::UnpauseVideoTile { tile_id }).await
    }

    /// Returns the flag's previous value.
    pub async fn mark_poor_connection(&self, tile_id: TileId) -> Result<bool, ClientError> {
        self.request(|respond_to| SessionMessage::MarkPoorConnection {
            tile_id,
            respond_to,
        })
        .await
    }

    /// Returns the flag's previous value.
    pub async fn unmark_poor_connection(&self, tile_id: TileId) -> Result<bool, ClientError> {
        self.request(|respond_to| SessionMessage::UnmarkPoorConnection {
            tile_id,
            respond_to,
        })
        .await
    }

    pub async fn remove_video_tile(&self, tile_id: TileId) -> Result<(), ClientError> {
        self.send(SessionMessage::RemoveVideoTile { tile_id }).await
    }

    pub async fn remove_video_tiles_by_attendee_id(
        &self,
        attendee_id: AttendeeId,
    ) -> Result<Vec<TileId>, ClientError> {
        self.request(|respond_to| SessionMessage::RemoveVideoTilesByAttendeeId {
            attendee_id,
            respond_to,
        })
        .await
    }

    pub async fn remove_all_video_tiles(&self) -> Result<(), ClientError> {
        self.send(SessionMessage::RemoveAllVideoTiles).await
    }

    pub async fn send_tile_state_update(&self, tile_id: TileId) -> Result<(), ClientError> {
        self.send(SessionMessage::SendTileStateUpdate { tile_id })
            .await
    }

    pub async fn get_video_tile(&self, tile_id: TileId) -> Result<Option<TileState>, ClientError> {
        self.request(|respond_to| SessionMessage::GetVideoTile {
            tile_id,
            respond_to,
        })
        .await
    }

    pub async fn get_all_video_tiles(&self) -> Result<Vec<TileState>, ClientError> {
        self.request(|respond_to| SessionMessage::GetAllVideoTiles { respond_to })
            .await
    }

    // Transport callbacks

    pub async fn presence(&self, event: PresenceEvent) -> Result<(), ClientError> {
        self.send(SessionMessage::Presence(event)).await
    }

    pub async fn volume_indicator(&self, update: VolumeIndicator) -> Result<(), ClientError> {
        self.send(SessionMessage::VolumeIndicator(update)).await
    }

    pub async fn active_speakers(&self, ranked: Vec<AttendeeId>) -> Result<(), ClientError> {
        self.send(SessionMessage::ActiveSpeakers(ranked)).await
    }

    pub async fn speaker_scores(
        &self,
        scores: BTreeMap<AttendeeId, f64>,
    ) -> Result<(), ClientError> {
        self.send(SessionMessage::SpeakerScores(scores)).await
    }

    pub async fn get_roster(&self) -> Result<Vec<RosterEntry>, ClientError> {
        self.request(|respond_to| SessionMessage::GetRoster { respond_to })
            .await
    }

    // Events

    pub async fn push_meeting_state(
        &self,
        state: MeetingHistoryState,
        timestamp_ms: Option<u64>,
    ) -> Result<(), ClientError> {
        self.send(SessionMessage::PushMeetingState {
            state,
            timestamp_ms,
        })
        .await
    }

    pub async fn publish_event(
        &self,
        name: EventName,
        attributes: Option<EventSpecificAttributes>,
    ) -> Result<DispatchReport, ClientError> {
        self.request(|respond_to| SessionMessage::PublishEvent {
            name,
            attributes,
            respond_to,
        })
        .await
    }

    pub async fn get_history(&self) -> Result<Vec<MeetingHistoryEntry>, ClientError> {
        self.request(|respond_to| SessionMessage::GetHistory { respond_to })
            .await
    }

    /// Cancel the session actor. It releases everything before exiting.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

/// Actor owning one call's session engine.
pub struct SessionActor {
    engine: SessionEngine,
    receiver: mpsc::Receiver<SessionMessage>,
    cancel_token: CancellationToken,
    messages_processed: u64,
}

impl SessionActor {
    /// Spawn the actor. The mailbox capacity comes from the engine's config,
    /// floored at one.
    pub fn spawn(
        engine: SessionEngine,
        cancel_token: CancellationToken,
    ) -> (SessionActorHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(engine.config().mailbox_capacity.max(1));
        let meeting_id = engine.config().meeting_id.clone();

        let actor = Self {
            engine,
            receiver,
            cancel_token: cancel_token.clone(),
            messages_processed: 0,
        };

        let task_handle = tokio::spawn(actor.run());

        let handle = SessionActorHandle {
            sender,
            cancel_token,
            meeting_id,
        };

        (handle, task_handle)
    }

    async fn run(mut self) {
        info!(
            target: "session.actor",
            meeting_id = %self.engine.config().meeting_id,
            "SessionActor started"
        );

        // First tick one period out; the timer owns the cadence.
        let mut score_timer = self.engine.roster().detector().score_interval().map(|period| {
            let mut timer = tokio::time::interval_at(Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            timer
        });

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!(
                        target: "session.actor",
                        meeting_id = %self.engine.config().meeting_id,
                        "SessionActor received cancellation signal"
                    );
                    break;
                }

                () = next_tick(&mut score_timer) => {
                    self.engine.flush_scores();
                }

                msg = self.receiver.recv() => {
                    match msg {
                        Some(message) => {
                            self.handle_message(message);
                            self.messages_processed += 1;
                        }
                        None => {
                            info!(
                                target: "session.actor",
                                meeting_id = %self.engine.config().meeting_id,
                                "SessionActor channel closed, exiting"
                            );
                            break;
                        }
                    }
                }
            }
        }

        self.engine.shutdown();

        info!(
            target: "session.actor",
            meeting_id = %self.engine.config().meeting_id,
            messages_processed = self.messages_processed,
            "SessionActor stopped"
        );
    }

    fn handle_message(&mut self, message: SessionMessage) {
        trace!(target: "session.actor", kind = message.kind(), "Handling message");

        match message {
            SessionMessage::AddObserver {
                observer,
                respond_to,
            } => {
                let _ = respond_to.send(self.engine.add_observer(observer));
            }
            SessionMessage::RemoveObserver { handle, respond_to } => {
                let _ = respond_to.send(self.engine.remove_observer(handle));
            }
            SessionMessage::AddVideoTile { respond_to } => {
                let _ = respond_to.send(self.engine.add_video_tile());
            }
            SessionMessage::StartLocalVideoTile { respond_to } => {
                let _ = respond_to.send(self.engine.start_local_video_tile());
            }
            SessionMessage::StopLocalVideoTile => self.engine.stop_local_video_tile(),
            SessionMessage::RemoveLocalVideoTile => self.engine.remove_local_video_tile(),
            SessionMessage::BindVideoStream { tile_id, binding } => {
                self.engine.bind_video_stream(tile_id, binding);
            }
            SessionMessage::UnbindVideoStream { tile_id } => {
                self.engine.unbind_video_stream(tile_id);
            }
            SessionMessage::BindVideoElement { tile_id, target } => {
                self.engine.bind_video_element(tile_id, target);
            }
            SessionMessage::UnbindVideoElement { tile_id } => {
                self.engine.unbind_video_element(tile_id);
            }
            SessionMessage::PauseVideoTile { tile_id } => self.engine.pause_video_tile(tile_id),
            SessionMessage::UnpauseVideoTile { tile_id } => {
                self.engine.unpause_video_tile(tile_id);
            }
            SessionMessage::MarkPoorConnection {
                tile_id,
                respond_to,
            } => {
                let _ = respond_to.send(self.engine.mark_poor_connection(tile_id));
            }
            SessionMessage::UnmarkPoorConnection {
                tile_id,
                respond_to,
            } => {
                let _ = respond_to.send(self.engine.unmark_poor_connection(tile_id));
            }
            SessionMessage::RemoveVideoTile { tile_id } => self.engine.remove_video_tile(tile_id),
            SessionMessage::RemoveVideoTilesByAttendeeId {
                attendee_id,
                respond_to,
            } => {
                let removed = self.engine.remove_video_tiles_by_attendee_id(&attendee_id);
                let _ = respond_to.send(removed);
            }
            SessionMessage::RemoveAllVideoTiles => self.engine.remove_all_video_tiles(),
            SessionMessage::SendTileStateUpdate { tile_id } => {
                self.engine.send_tile_state_update(tile_id);
            }
            SessionMessage::GetVideoTile {
                tile_id,
                respond_to,
            } => {
                let _ = respond_to.send(self.engine.get_video_tile(tile_id).cloned());
            }
            SessionMessage::GetAllVideoTiles { respond_to } => {
                let tiles = self
                    .engine
                    .tiles()
                    .get_all_video_tiles()
                    .into_iter()
                    .cloned()
                    .collect();
                let _ = respond_to.send(tiles);
            }
            SessionMessage::Presence(event) => {
                self.engine.on_presence(&event);
            }
            SessionMessage::VolumeIndicator(update) => self.engine.on_volume_indicator(&update),
            SessionMessage::ActiveSpeakers(ranked) => self.engine.on_active_speakers(&ranked),
            SessionMessage::SpeakerScores(scores) => self.engine.on_speaker_scores(&scores),
            SessionMessage::GetRoster { respond_to } => {
                let _ = respond_to.send(self.engine.roster_view());
            }
            SessionMessage::PushMeetingState {
                state,
                timestamp_ms,
            } => self.engine.push_meeting_state(state, timestamp_ms),
            SessionMessage::PublishEvent {
                name,
                attributes,
                respond_to,
            } => {
                let report = self.engine.publish_event(name, attributes);
                let _ = respond_to.send(report);
            }
            SessionMessage::GetHistory { respond_to } => {
                let _ = respond_to.send(self.engine.history().to_vec());
            }
        }

        debug!(
            target: "session.actor",
            processed = self.messages_processed + 1,
            "Message handled"
        );
    }
}

/// Resolves on the next timer tick, or never when there is no timer.
async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending().await,
    }
}
