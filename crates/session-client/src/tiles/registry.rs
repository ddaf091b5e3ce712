//! `TileRegistry` - owns every video tile of the session.
//!
//! All mutating operations take the engine's [`ObserverSet`] and notify it
//! synchronously when, and only when, a tile's snapshot actually changed.
//! Operations on an unknown tile id are no-ops: they return without
//! notifying and without error.

use common::types::{AttendeeId, TileId};
use std::collections::BTreeMap;
use tracing::{debug, error, info};

use super::tile::{StreamBinding, TileState, VideoTile};
use crate::observability::metrics::set_tiles_active;
use crate::observers::ObserverSet;
use crate::transport::{MediaStream, RenderTarget};

/// First id handed out by a fresh registry.
const FIRST_TILE_ID: u64 = 1;

/// Registry of the session's video tiles.
#[derive(Debug)]
pub struct TileRegistry {
    /// Tiles by id. Ordered so queries and bulk removal are deterministic.
    tiles: BTreeMap<TileId, VideoTile>,
    /// Next id to allocate. Only ever increases; `None` once the id space is spent.
    next_tile_id: Option<u64>,
    /// The local tile, if started.
    local_tile_id: Option<TileId>,
}

impl Default for TileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TileRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tiles: BTreeMap::new(),
            next_tile_id: Some(FIRST_TILE_ID),
            local_tile_id: None,
        }
    }

    /// Create a new inert remote tile with a fresh id.
    pub fn add_video_tile(&mut self, observers: &ObserverSet) -> TileId {
        self.insert_tile(false, observers)
    }

    /// Start the local tile, or return the existing one's id.
    pub fn start_local_video_tile(&mut self, observers: &ObserverSet) -> TileId {
        if let Some(tile_id) = self.local_tile_id {
            debug!(
                target: "session.tiles",
                tile_id = %tile_id,
                "Local video tile already started"
            );
            return tile_id;
        }

        let tile_id = self.insert_tile(true, observers);
        self.local_tile_id = Some(tile_id);

        info!(
            target: "session.tiles",
            tile_id = %tile_id,
            "Local video tile started"
        );
        tile_id
    }

    /// Release the local tile's stream. The tile itself stays registered.
    pub fn stop_local_video_tile(&mut self, observers: &ObserverSet) {
        if let Some(tile_id) = self.local_tile_id {
            self.unbind_video_stream(tile_id, observers);
        }
    }

    #[must_use]
    pub fn has_started_local_video_tile(&self) -> bool {
        self.local_tile_id.is_some()
    }

    #[must_use]
    pub fn get_local_video_tile(&self) -> Option<&TileState> {
        self.local_tile_id.and_then(|id| self.get_video_tile(id))
    }

    /// Stop and remove the local tile, if any.
    pub fn remove_local_video_tile(&mut self, observers: &ObserverSet) {
        if let Some(tile_id) = self.local_tile_id {
            self.stop_local_video_tile(observers);
            self.remove_video_tile(tile_id, observers);
        }
    }

    /// Hand a stream to the tile, releasing any stream it previously owned.
    pub fn bind_video_stream(
        &mut self,
        tile_id: TileId,
        binding: StreamBinding,
        observers: &ObserverSet,
    ) {
        let mut released = None;
        self.commit(tile_id, observers, |tile| {
            released = tile.bind_stream(binding);
        });
        release_stream(tile_id, released);
    }

    /// Release the tile's stream, if any.
    pub fn unbind_video_stream(&mut self, tile_id: TileId, observers: &ObserverSet) {
        let mut released = None;
        self.commit(tile_id, observers, |tile| {
            released = tile.unbind_stream();
        });
        release_stream(tile_id, released);
    }

    /// Attach a render target to the tile.
    ///
    /// A render target shows at most one tile: if another tile currently
    /// holds `target`, it is unbound there first.
    pub fn bind_video_element(
        &mut self,
        tile_id: TileId,
        target: RenderTarget,
        observers: &ObserverSet,
    ) {
        if !self.tiles.contains_key(&tile_id) {
            debug!(
                target: "session.tiles",
                tile_id = %tile_id,
                "Ignoring render target bind for unknown tile"
            );
            return;
        }

        let holders: Vec<TileId> = self
            .tiles
            .values()
            .filter(|t| t.state.tile_id != tile_id)
            .filter(|t| t.state.bound_render_target == Some(target.id))
            .map(|t| t.state.tile_id)
            .collect();
        for holder in holders {
            debug!(
                target: "session.tiles",
                tile_id = %holder,
                render_target = %target.id,
                "Moving render target to another tile"
            );
            self.unbind_video_element(holder, observers);
        }

        self.commit(tile_id, observers, |tile| tile.bind_render_target(target));
    }

    /// Detach the tile's render target and forget its size.
    pub fn unbind_video_element(&mut self, tile_id: TileId, observers: &ObserverSet) {
        self.commit(tile_id, observers, VideoTile::unbind_render_target);
    }

    pub fn pause_video_tile(&mut self, tile_id: TileId, observers: &ObserverSet) {
        self.commit(tile_id, observers, |tile| {
            if !tile.state.paused {
                tile.pause();
            }
        });
    }

    pub fn unpause_video_tile(&mut self, tile_id: TileId, observers: &ObserverSet) {
        self.commit(tile_id, observers, |tile| {
            if tile.state.paused {
                tile.unpause();
            }
        });
    }

    /// Set the poor-connection flag, returning its previous value.
    /// Unknown tiles report `false`.
    pub fn mark_poor_connection(&mut self, tile_id: TileId, observers: &ObserverSet) -> bool {
        self.set_poor_connection(tile_id, true, observers)
    }

    /// Clear the poor-connection flag, returning its previous value.
    /// Unknown tiles report `false`.
    pub fn unmark_poor_connection(&mut self, tile_id: TileId, observers: &ObserverSet) -> bool {
        self.set_poor_connection(tile_id, false, observers)
    }

    /// Unbind and delete the tile, then notify observers of the removal.
    pub fn remove_video_tile(&mut self, tile_id: TileId, observers: &ObserverSet) {
        let Some(mut tile) = self.tiles.remove(&tile_id) else {
            debug!(
                target: "session.tiles",
                tile_id = %tile_id,
                "Ignoring removal of unknown tile"
            );
            return;
        };

        tile.unbind_render_target();
        release_stream(tile_id, tile.unbind_stream());
        if self.local_tile_id == Some(tile_id) {
            self.local_tile_id = None;
        }
        set_tiles_active(self.tiles.len());

        debug!(
            target: "session.tiles",
            tile_id = %tile_id,
            remaining = self.tiles.len(),
            "Video tile removed"
        );
        observers.tile_removed(tile_id);
    }

    /// Remove every tile bound to `attendee_id`, returning the removed ids
    /// in ascending order.
    pub fn remove_video_tiles_by_attendee_id(
        &mut self,
        attendee_id: &AttendeeId,
        observers: &ObserverSet,
    ) -> Vec<TileId> {
        let removed: Vec<TileId> = self
            .tiles
            .values()
            .filter(|t| t.state.bound_attendee_id.as_ref() == Some(attendee_id))
            .map(|t| t.state.tile_id)
            .collect();

        for tile_id in &removed {
            self.remove_video_tile(*tile_id, observers);
        }
        removed
    }

    /// Remove every tile, in ascending id order.
    pub fn remove_all_video_tiles(&mut self, observers: &ObserverSet) {
        let ids: Vec<TileId> = self.tiles.keys().copied().collect();
        for tile_id in ids {
            self.remove_video_tile(tile_id, observers);
        }
    }

    /// Re-broadcast the tile's current state without changing it.
    pub fn send_tile_state_update(&self, tile_id: TileId, observers: &ObserverSet) {
        if let Some(tile) = self.tiles.get(&tile_id) {
            observers.tile_updated(tile_id, Some(&tile.state), &tile.state);
        }
    }

    #[must_use]
    pub fn get_video_tile(&self, tile_id: TileId) -> Option<&TileState> {
        self.tiles.get(&tile_id).map(|t| &t.state)
    }

    /// Physical pixel area of the tile's last known render target, or 0.
    #[must_use]
    pub fn get_video_tile_area(&self, tile: &TileState) -> u64 {
        tile.render_area()
    }

    #[must_use]
    pub fn get_all_video_tiles(&self) -> Vec<&TileState> {
        self.tiles.values().map(|t| &t.state).collect()
    }

    #[must_use]
    pub fn get_all_remote_video_tiles(&self) -> Vec<&TileState> {
        self.tiles
            .values()
            .map(|t| &t.state)
            .filter(|s| !s.local_tile)
            .collect()
    }

    #[must_use]
    pub fn have_video_tiles_with_streams(&self) -> bool {
        self.tiles.values().any(|t| t.stream.is_some())
    }

    #[must_use]
    pub fn have_video_tile_for_attendee_id(&self, attendee_id: &AttendeeId) -> bool {
        self.tiles
            .values()
            .any(|t| t.state.bound_attendee_id.as_ref() == Some(attendee_id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    fn insert_tile(&mut self, local_tile: bool, observers: &ObserverSet) -> TileId {
        let tile_id = match self.next_tile_id {
            Some(next) => TileId(next),
            None => {
                // No tile is created once every id has been handed out.
                error!(target: "session.tiles", "Tile id space exhausted");
                return TileId(u64::MAX);
            }
        };
        self.next_tile_id = tile_id.0.checked_add(1);

        let tile = VideoTile::new(tile_id, local_tile);
        observers.tile_updated(tile_id, None, &tile.state);
        self.tiles.insert(tile_id, tile);
        set_tiles_active(self.tiles.len());

        debug!(
            target: "session.tiles",
            tile_id = %tile_id,
            local_tile,
            "Video tile added"
        );
        tile_id
    }

    fn set_poor_connection(&mut self, tile_id: TileId, marked: bool, observers: &ObserverSet) -> bool {
        let mut previous = false;
        self.commit(tile_id, observers, |tile| {
            previous = tile.state.poor_connection;
            tile.state.poor_connection = marked;
        });
        previous
    }

    /// Apply `mutate` to the tile and notify observers if its snapshot changed.
    /// Returns `false` if the tile does not exist.
    fn commit<F>(&mut self, tile_id: TileId, observers: &ObserverSet, mutate: F) -> bool
    where
        F: FnOnce(&mut VideoTile),
    {
        let Some(tile) = self.tiles.get_mut(&tile_id) else {
            debug!(
                target: "session.tiles",
                tile_id = %tile_id,
                "Ignoring operation on unknown tile"
            );
            return false;
        };

        let previous = tile.state.clone();
        mutate(tile);
        if tile.state != previous {
            observers.tile_updated(tile_id, Some(&previous), &tile.state);
        }
        true
    }
}

fn release_stream(tile_id: TileId, stream: Option<Box<dyn MediaStream>>) {
    if let Some(stream) = stream {
        debug!(
            target: "session.tiles",
            tile_id = %tile_id,
            stream_id = stream.id(),
            "Releasing media stream"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::errors::ObserverError;
    use crate::observers::SessionObserver;
    use common::types::RenderTargetId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Debug)]
    struct TestStream {
        id: String,
        released: Arc<AtomicUsize>,
    }

    impl MediaStream for TestStream {
        fn id(&self) -> &str {
            &self.id
        }
    }

    impl Drop for TestStream {
        fn drop(&mut self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Debug, PartialEq)]
    enum Seen {
        Updated(TileId, Option<TileState>, TileState),
        Removed(TileId),
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<Seen>>,
    }

    impl Recorder {
        fn take(&self) -> Vec<Seen> {
            std::mem::take(&mut *self.seen.lock().unwrap())
        }
    }

    impl SessionObserver for Recorder {
        fn video_tile_did_update(
            &self,
            tile_id: TileId,
            previous: Option<&TileState>,
            current: &TileState,
        ) -> Result<(), ObserverError> {
            self.seen
                .lock()
                .unwrap()
                .push(Seen::Updated(tile_id, previous.cloned(), current.clone()));
            Ok(())
        }

        fn video_tile_was_removed(&self, tile_id: TileId) -> Result<(), ObserverError> {
            self.seen.lock().unwrap().push(Seen::Removed(tile_id));
            Ok(())
        }
    }

    fn setup() -> (TileRegistry, ObserverSet, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let mut observers = ObserverSet::new();
        observers.add(recorder.clone());
        (TileRegistry::new(), observers, recorder)
    }

    fn stream(id: &str, released: &Arc<AtomicUsize>) -> Box<dyn MediaStream> {
        Box::new(TestStream {
            id: id.to_string(),
            released: Arc::clone(released),
        })
    }

    fn target(id: u64, w: u32, h: u32) -> RenderTarget {
        RenderTarget::new(RenderTargetId(id), w, h)
    }

    #[test]
    fn test_tile_ids_are_monotonic_and_never_reused() {
        let (mut registry, observers, _) = setup();

        let a = registry.add_video_tile(&observers);
        let b = registry.add_video_tile(&observers);
        registry.remove_video_tile(b, &observers);
        let c = registry.add_video_tile(&observers);

        assert_eq!(a, TileId(1));
        assert_eq!(b, TileId(2));
        assert_eq!(c, TileId(3));
        assert_eq!(
            registry
                .get_all_video_tiles()
                .iter()
                .map(|t| t.tile_id)
                .collect::<Vec<_>>(),
            vec![a, c]
        );
    }

    #[test]
    fn test_id_allocation_stops_at_top_of_range() {
        let (mut registry, observers, recorder) = setup();
        registry.next_tile_id = Some(u64::MAX - 1);

        let a = registry.add_video_tile(&observers);
        let b = registry.add_video_tile(&observers);
        recorder.take();
        let c = registry.add_video_tile(&observers);

        assert_eq!(a, TileId(u64::MAX - 1));
        assert_eq!(b, TileId(u64::MAX));
        assert_eq!(c, TileId(u64::MAX));
        assert_eq!(registry.len(), 2);
        assert!(recorder.take().is_empty());
    }

    #[test]
    fn test_add_notifies_with_no_previous_state() {
        let (mut registry, observers, recorder) = setup();

        let id = registry.add_video_tile(&observers);

        let seen = recorder.take();
        assert_eq!(seen.len(), 1);
        assert!(matches!(&seen[0], Seen::Updated(t, None, s) if *t == id && !s.active));
    }

    #[test]
    fn test_start_local_video_tile_is_idempotent() {
        let (mut registry, observers, _) = setup();

        let first = registry.start_local_video_tile(&observers);
        let second = registry.start_local_video_tile(&observers);

        assert_eq!(first, second);
        assert!(registry.has_started_local_video_tile());
        assert_eq!(
            registry
                .get_all_video_tiles()
                .iter()
                .filter(|t| t.local_tile)
                .count(),
            1
        );
        assert!(registry.get_all_remote_video_tiles().is_empty());
    }

    #[test]
    fn test_stop_local_releases_stream_but_keeps_tile() {
        let (mut registry, observers, _) = setup();
        let released = Arc::new(AtomicUsize::new(0));

        let id = registry.start_local_video_tile(&observers);
        registry.bind_video_stream(
            id,
            StreamBinding::new(AttendeeId::new("me"), stream("local", &released)),
            &observers,
        );
        assert!(registry.have_video_tiles_with_streams());

        registry.stop_local_video_tile(&observers);

        assert_eq!(released.load(Ordering::SeqCst), 1);
        assert!(!registry.have_video_tiles_with_streams());
        let tile = registry.get_video_tile(id).unwrap();
        assert!(tile.bound_stream_id.is_none());
        assert!(!tile.active);
    }

    #[test]
    fn test_remove_local_then_start_allocates_new_id() {
        let (mut registry, observers, recorder) = setup();

        let first = registry.start_local_video_tile(&observers);
        registry.remove_local_video_tile(&observers);
        assert!(!registry.has_started_local_video_tile());
        assert!(recorder.take().contains(&Seen::Removed(first)));

        let second = registry.start_local_video_tile(&observers);
        assert!(second > first);
    }

    #[test]
    fn test_local_tile_operations_without_local_tile_are_noops() {
        let (mut registry, observers, recorder) = setup();

        registry.stop_local_video_tile(&observers);
        registry.remove_local_video_tile(&observers);

        assert!(registry.get_local_video_tile().is_none());
        assert!(recorder.take().is_empty());
    }

    #[test]
    fn test_bind_stream_replaces_and_releases_previous() {
        let (mut registry, observers, _) = setup();
        let released = Arc::new(AtomicUsize::new(0));
        let id = registry.add_video_tile(&observers);

        registry.bind_video_stream(
            id,
            StreamBinding::new(AttendeeId::new("a"), stream("s1", &released))
                .with_content_size(640, 480),
            &observers,
        );
        registry.bind_video_stream(
            id,
            StreamBinding::new(AttendeeId::new("a"), stream("s2", &released)),
            &observers,
        );

        assert_eq!(released.load(Ordering::SeqCst), 1);
        let tile = registry.get_video_tile(id).unwrap();
        assert_eq!(tile.bound_stream_id.as_deref(), Some("s2"));
        assert!(tile.active);
        assert!(tile.stream_content_width.is_none());
    }

    #[test]
    fn test_bind_stream_marks_content_tiles() {
        let (mut registry, observers, _) = setup();
        let released = Arc::new(AtomicUsize::new(0));
        let id = registry.add_video_tile(&observers);

        registry.bind_video_stream(
            id,
            StreamBinding::new(AttendeeId::new("a#content"), stream("s", &released)),
            &observers,
        );

        assert!(registry.get_video_tile(id).unwrap().is_content);
    }

    #[test]
    fn test_bind_video_element_unknown_tile_is_noop() {
        let (mut registry, observers, recorder) = setup();

        registry.bind_video_element(TileId(99), target(1, 10, 10), &observers);
        registry.unbind_video_element(TileId(99), &observers);

        assert!(recorder.take().is_empty());
    }

    #[test]
    fn test_render_target_bound_to_one_tile_at_a_time() {
        let (mut registry, observers, recorder) = setup();
        let a = registry.add_video_tile(&observers);
        let b = registry.add_video_tile(&observers);
        recorder.take();

        registry.bind_video_element(a, target(7, 100, 50), &observers);
        registry.bind_video_element(b, target(7, 100, 50), &observers);

        assert!(registry.get_video_tile(a).unwrap().bound_render_target.is_none());
        assert_eq!(
            registry.get_video_tile(b).unwrap().bound_render_target,
            Some(RenderTargetId(7))
        );

        // bind a, unbind a (moved), bind b
        let seen = recorder.take();
        assert_eq!(seen.len(), 3);
        assert!(matches!(&seen[1], Seen::Updated(t, _, s) if *t == a && s.bound_render_target.is_none()));
    }

    #[test]
    fn test_video_tile_area() {
        let (mut registry, observers, _) = setup();
        let id = registry.add_video_tile(&observers);

        let tile = registry.get_video_tile(id).unwrap().clone();
        assert_eq!(registry.get_video_tile_area(&tile), 0);

        registry.bind_video_element(id, target(1, 1280, 720), &observers);
        let tile = registry.get_video_tile(id).unwrap().clone();
        assert_eq!(registry.get_video_tile_area(&tile), 1280 * 720);

        // Layout change: re-binding refreshes the size
        registry.bind_video_element(id, target(1, 640, 360), &observers);
        let tile = registry.get_video_tile(id).unwrap().clone();
        assert_eq!(registry.get_video_tile_area(&tile), 640 * 360);

        registry.unbind_video_element(id, &observers);
        let tile = registry.get_video_tile(id).unwrap().clone();
        assert_eq!(registry.get_video_tile_area(&tile), 0);
        assert!(tile.render_target_width.is_none());
    }

    #[test]
    fn test_pause_unpause_round_trip() {
        let (mut registry, observers, recorder) = setup();
        let id = registry.add_video_tile(&observers);
        recorder.take();

        registry.pause_video_tile(id, &observers);
        registry.pause_video_tile(id, &observers);
        let tile = registry.get_video_tile(id).unwrap();
        assert!(tile.paused);
        assert!(!tile.active);

        registry.unpause_video_tile(id, &observers);
        registry.unpause_video_tile(id, &observers);
        let tile = registry.get_video_tile(id).unwrap();
        assert!(!tile.paused);
        assert!(tile.active);

        // Exactly one notification per transition
        assert_eq!(recorder.take().len(), 2);
    }

    #[test]
    fn test_pause_unknown_tile_is_silent() {
        let (mut registry, observers, recorder) = setup();

        registry.pause_video_tile(TileId(5), &observers);
        registry.unpause_video_tile(TileId(5), &observers);

        assert!(recorder.take().is_empty());
    }

    #[test]
    fn test_binding_stream_while_paused_stays_inactive() {
        let (mut registry, observers, _) = setup();
        let released = Arc::new(AtomicUsize::new(0));
        let id = registry.add_video_tile(&observers);

        registry.pause_video_tile(id, &observers);
        registry.bind_video_stream(
            id,
            StreamBinding::new(AttendeeId::new("a"), stream("s", &released)),
            &observers,
        );

        let tile = registry.get_video_tile(id).unwrap();
        assert!(tile.paused);
        assert!(!tile.active);
    }

    #[test]
    fn test_poor_connection_returns_previous_value() {
        let (mut registry, observers, recorder) = setup();
        let id = registry.add_video_tile(&observers);
        registry.pause_video_tile(id, &observers);
        recorder.take();

        assert!(!registry.mark_poor_connection(id, &observers));
        assert!(registry.mark_poor_connection(id, &observers));
        assert!(registry.get_video_tile(id).unwrap().poor_connection);
        assert!(registry.get_video_tile(id).unwrap().paused);

        assert!(registry.unmark_poor_connection(id, &observers));
        assert!(!registry.unmark_poor_connection(id, &observers));

        assert_eq!(recorder.take().len(), 2);
        assert!(!registry.mark_poor_connection(TileId(42), &observers));
    }

    #[test]
    fn test_remove_video_tile_releases_and_notifies_removal() {
        let (mut registry, observers, recorder) = setup();
        let released = Arc::new(AtomicUsize::new(0));
        let id = registry.add_video_tile(&observers);
        registry.bind_video_stream(
            id,
            StreamBinding::new(AttendeeId::new("a"), stream("s", &released)),
            &observers,
        );
        registry.bind_video_element(id, target(3, 10, 10), &observers);
        recorder.take();

        registry.remove_video_tile(id, &observers);

        assert_eq!(released.load(Ordering::SeqCst), 1);
        assert!(registry.get_video_tile(id).is_none());
        assert_eq!(recorder.take(), vec![Seen::Removed(id)]);

        // Target is free again for another tile, nothing to move
        let other = registry.add_video_tile(&observers);
        recorder.take();
        registry.bind_video_element(other, target(3, 10, 10), &observers);
        assert_eq!(recorder.take().len(), 1);
    }

    #[test]
    fn test_remove_video_tiles_by_attendee_id() {
        let (mut registry, observers, _) = setup();
        let released = Arc::new(AtomicUsize::new(0));
        let camera = registry.add_video_tile(&observers);
        let content = registry.add_video_tile(&observers);
        let other = registry.add_video_tile(&observers);

        for (id, attendee) in [(camera, "a"), (content, "a"), (other, "b")] {
            registry.bind_video_stream(
                id,
                StreamBinding::new(AttendeeId::new(attendee), stream("s", &released)),
                &observers,
            );
        }

        let removed = registry.remove_video_tiles_by_attendee_id(&AttendeeId::new("a"), &observers);

        assert_eq!(removed, vec![camera, content]);
        assert!(!registry.have_video_tile_for_attendee_id(&AttendeeId::new("a")));
        assert!(registry.have_video_tile_for_attendee_id(&AttendeeId::new("b")));
        assert_eq!(released.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_remove_all_video_tiles() {
        let (mut registry, observers, recorder) = setup();
        let a = registry.add_video_tile(&observers);
        let b = registry.start_local_video_tile(&observers);
        recorder.take();

        registry.remove_all_video_tiles(&observers);

        assert!(registry.is_empty());
        assert!(!registry.has_started_local_video_tile());
        assert_eq!(recorder.take(), vec![Seen::Removed(a), Seen::Removed(b)]);
    }

    #[test]
    fn test_send_tile_state_update_rebroadcasts_current_state() {
        let (mut registry, observers, recorder) = setup();
        let id = registry.add_video_tile(&observers);
        recorder.take();

        registry.send_tile_state_update(id, &observers);
        registry.send_tile_state_update(TileId(77), &observers);

        let seen = recorder.take();
        assert_eq!(seen.len(), 1);
        assert!(matches!(&seen[0], Seen::Updated(t, Some(p), c) if *t == id && p == c));
    }

    #[test]
    fn test_queries_do_not_notify() {
        let (mut registry, observers, recorder) = setup();
        let id = registry.add_video_tile(&observers);
        recorder.take();

        let _ = registry.get_video_tile(id);
        let _ = registry.get_all_video_tiles();
        let _ = registry.get_all_remote_video_tiles();
        let _ = registry.have_video_tiles_with_streams();
        let _ = registry.have_video_tile_for_attendee_id(&AttendeeId::new("x"));

        assert!(recorder.take().is_empty());
    }
}
