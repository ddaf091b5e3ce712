//! Tile state snapshot and the owned tile record.

use common::types::{AttendeeId, RenderTargetId, TileId};
use serde::Serialize;

use crate::transport::{MediaStream, RenderTarget};

/// Immutable snapshot of a tile's state, handed to observers and queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileState {
    pub tile_id: TileId,
    /// Fixed at creation. At most one local tile exists at a time.
    pub local_tile: bool,
    /// Whether the bound attendee is a shared-content attendee.
    pub is_content: bool,
    pub active: bool,
    pub paused: bool,
    pub poor_connection: bool,
    pub bound_attendee_id: Option<AttendeeId>,
    pub bound_external_user_id: Option<String>,
    /// Id of the owned stream, if one is bound.
    pub bound_stream_id: Option<String>,
    pub stream_content_width: Option<u32>,
    pub stream_content_height: Option<u32>,
    pub bound_render_target: Option<RenderTargetId>,
    /// Last known physical size of the bound render target.
    pub render_target_width: Option<u32>,
    pub render_target_height: Option<u32>,
}

impl TileState {
    pub(crate) fn new(tile_id: TileId, local_tile: bool) -> Self {
        Self {
            tile_id,
            local_tile,
            is_content: false,
            active: false,
            paused: false,
            poor_connection: false,
            bound_attendee_id: None,
            bound_external_user_id: None,
            bound_stream_id: None,
            stream_content_width: None,
            stream_content_height: None,
            bound_render_target: None,
            render_target_width: None,
            render_target_height: None,
        }
    }

    /// Returns whether a stream is currently bound.
    #[must_use]
    pub fn has_stream(&self) -> bool {
        self.bound_stream_id.is_some()
    }

    /// Physical pixel area of the last known render target size, or 0.
    #[must_use]
    pub fn render_area(&self) -> u64 {
        match (self.render_target_width, self.render_target_height) {
            (Some(w), Some(h)) => u64::from(w) * u64::from(h),
            _ => 0,
        }
    }
}

/// Stream binding request from the transport layer.
#[derive(Debug)]
pub struct StreamBinding {
    pub attendee_id: AttendeeId,
    pub external_user_id: Option<String>,
    pub stream: Box<dyn MediaStream>,
    pub content_width: Option<u32>,
    pub content_height: Option<u32>,
}

impl StreamBinding {
    #[must_use]
    pub fn new(attendee_id: AttendeeId, stream: Box<dyn MediaStream>) -> Self {
        Self {
            attendee_id,
            external_user_id: None,
            stream,
            content_width: None,
            content_height: None,
        }
    }

    #[must_use]
    pub fn with_external_user_id(mut self, external_user_id: impl Into<String>) -> Self {
        self.external_user_id = Some(external_user_id.into());
        self
    }

    #[must_use]
    pub fn with_content_size(mut self, width: u32, height: u32) -> Self {
        self.content_width = Some(width);
        self.content_height = Some(height);
        self
    }
}

/// A tile as owned by the registry: its state plus the owned stream handle.
#[derive(Debug)]
pub(crate) struct VideoTile {
    pub(crate) state: TileState,
    pub(crate) stream: Option<Box<dyn MediaStream>>,
}

impl VideoTile {
    pub(crate) fn new(tile_id: TileId, local_tile: bool) -> Self {
        Self {
            state: TileState::new(tile_id, local_tile),
            stream: None,
        }
    }

    /// Take ownership of a stream, returning the previously bound one.
    pub(crate) fn bind_stream(&mut self, binding: StreamBinding) -> Option<Box<dyn MediaStream>> {
        let state = &mut self.state;
        state.is_content = binding.attendee_id.is_content();
        state.bound_attendee_id = Some(binding.attendee_id);
        state.bound_external_user_id = binding.external_user_id;
        state.bound_stream_id = Some(binding.stream.id().to_string());
        state.stream_content_width = binding.content_width;
        state.stream_content_height = binding.content_height;
        state.active = !state.paused;
        self.stream.replace(binding.stream)
    }

    /// Give up the owned stream. Attendee binding is kept.
    pub(crate) fn unbind_stream(&mut self) -> Option<Box<dyn MediaStream>> {
        let state = &mut self.state;
        state.bound_stream_id = None;
        state.stream_content_width = None;
        state.stream_content_height = None;
        state.active = false;
        self.stream.take()
    }

    pub(crate) fn bind_render_target(&mut self, target: RenderTarget) {
        self.state.bound_render_target = Some(target.id);
        self.state.render_target_width = Some(target.physical_width);
        self.state.render_target_height = Some(target.physical_height);
    }

    pub(crate) fn unbind_render_target(&mut self) {
        self.state.bound_render_target = None;
        self.state.render_target_width = None;
        self.state.render_target_height = None;
    }

    pub(crate) fn pause(&mut self) {
        self.state.paused = true;
        self.state.active = false;
    }

    pub(crate) fn unpause(&mut self) {
        self.state.paused = false;
        self.state.active = true;
    }
}
