//! Messages accepted by the session actor.

use common::types::{AttendeeId, TileId};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::oneshot;

use crate::events::{EventName, EventSpecificAttributes, MeetingHistoryEntry, MeetingHistoryState};
use crate::observers::{DispatchReport, ObserverHandle, SessionObserver};
use crate::roster::{PresenceEvent, RosterEntry, VolumeIndicator};
use crate::tiles::{StreamBinding, TileState};
use crate::transport::RenderTarget;

/// Mailbox message for [`SessionActor`](super::SessionActor).
pub enum SessionMessage {
    // Observers
    AddObserver {
        observer: Arc<dyn SessionObserver>,
        respond_to: oneshot::Sender<ObserverHandle>,
    },
    RemoveObserver {
        handle: ObserverHandle,
        respond_to: oneshot::Sender<bool>,
    },

    // Tiles
    AddVideoTile {
        respond_to: oneshot::Sender<TileId>,
    },
    StartLocalVideoTile {
        respond_to: oneshot::Sender<TileId>,
    },
    StopLocalVideoTile,
    RemoveLocalVideoTile,
    BindVideoStream {
        tile_id: TileId,
        binding: StreamBinding,
    },
    UnbindVideoStream {
        tile_id: TileId,
    },
    BindVideoElement {
        tile_id: TileId,
        target: RenderTarget,
    },
    UnbindVideoElement {
        tile_id: TileId,
    },
    PauseVideoTile {
        tile_id: TileId,
    },
    UnpauseVideoTile {
        tile_id: TileId,
    },
    MarkPoorConnection {
        tile_id: TileId,
        respond_to: oneshot::Sender<bool>,
    },
    UnmarkPoorConnection {
        tile_id: TileId,
        respond_to: oneshot::Sender<bool>,
    },
    RemoveVideoTile {
        tile_id: TileId,
    },
    RemoveVideoTilesByAttendeeId {
        attendee_id: AttendeeId,
        respond_to: oneshot::Sender<Vec<TileId>>,
    },
    RemoveAllVideoTiles,
    SendTileStateUpdate {
        tile_id: TileId,
    },
    GetVideoTile {
        tile_id: TileId,
        respond_to: oneshot::Sender<Option<TileState>>,
    },
    GetAllVideoTiles {
        respond_to: oneshot::Sender<Vec<TileState>>,
    },

    // Roster
    Presence(PresenceEvent),
    VolumeIndicator(VolumeIndicator),
    ActiveSpeakers(Vec<AttendeeId>),
    SpeakerScores(BTreeMap<AttendeeId, f64>),
    GetRoster {
        respond_to: oneshot::Sender<Vec<RosterEntry>>,
    },

    // Events
    PushMeetingState {
        state: MeetingHistoryState,
        timestamp_ms: Option<u64>,
    },
    PublishEvent {
        name: EventName,
        attributes: Option<EventSpecificAttributes>,
        respond_to: oneshot::Sender<DispatchReport>,
    },
    GetHistory {
        respond_to: oneshot::Sender<Vec<MeetingHistoryEntry>>,
    },
}

impl SessionMessage {
    /// Short name for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddObserver { .. } => "add_observer",
            Self::RemoveObserver { .. } => "remove_observer",
            Self::AddVideoTile { .. } => "add_video_tile",
            Self::StartLocalVideoTile { .. } => "start_local_video_tile",
            Self::StopLocalVideoTile => "stop_local_video_tile",
            Self::RemoveLocalVideoTile => "remove_local_video_tile",
            Self::BindVideoStream { .. } => "bind_video_stream",
            Self::UnbindVideoStream { .. } => "unbind_video_stream",
            Self::BindVideoElement { .. } => "bind_video_element",
            Self::UnbindVideoElement { .. } => "unbind_video_element",
            Self::PauseVideoTile { .. } => "pause_video_tile",
            Self::UnpauseVideoTile { .. } => "unpause_video_tile",
            Self::MarkPoorConnection { .. } => "mark_poor_connection",
            Self::UnmarkPoorConnection { .. } => "unmark_poor_connection",
            Self::RemoveVideoTile { .. } => "remove_video_tile",
            Self::RemoveVideoTilesByAttendeeId { .. } => "remove_video_tiles_by_attendee_id",
            Self::RemoveAllVideoTiles => "remove_all_video_tiles",
            Self::SendTileStateUpdate { .. } => "send_tile_state_update",
            Self::GetVideoTile { .. } => "get_video_tile",
            Self::GetAllVideoTiles { .. } => "get_all_video_tiles",
            Self::Presence(_) => "presence",
            Self::VolumeIndicator(_) => "volume_indicator",
            Self::ActiveSpeakers(_) => "active_speakers",
            Self::SpeakerScores(_) => "speaker_scores",
            Self::GetRoster { .. } => "get_roster",
            Self::PushMeetingState { .. } => "push_meeting_state",
            Self::PublishEvent { .. } => "publish_event",
            Self::GetHistory { .. } => "get_history",
        }
    }
}
