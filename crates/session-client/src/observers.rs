//! Observer trait and the engine-owned observer collection.
//!
//! Observers are registered explicitly on the engine and receive
//! notifications synchronously, in commit order. Every callback is
//! isolated: an `Err` return or a panic inside one observer is logged,
//! counted, and does not prevent delivery to the remaining observers.
//! The same policy applies to tile, roster and event notifications.

use common::types::TileId;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, warn};

use crate::errors::ObserverError;
use crate::events::{EventAttributes, EventName};
use crate::observability::metrics::record_observer_failure;
use crate::roster::RosterEntry;
use crate::tiles::TileState;

/// Receiver of session notifications. Every method has a no-op default.
pub trait SessionObserver: Send + Sync {
    /// A tile was added or its state changed. `previous` is `None` for a new tile.
    fn video_tile_did_update(
        &self,
        _tile_id: TileId,
        _previous: Option<&TileState>,
        _current: &TileState,
    ) -> Result<(), ObserverError> {
        Ok(())
    }

    /// A tile was removed. Its state no longer exists.
    fn video_tile_was_removed(&self, _tile_id: TileId) -> Result<(), ObserverError> {
        Ok(())
    }

    /// The roster changed. `roster` is the full current view.
    fn roster_did_update(&self, _roster: &[RosterEntry]) -> Result<(), ObserverError> {
        Ok(())
    }

    /// Optional event-reception capability. Observers returning `None` are
    /// skipped when an event is published.
    fn event_receiver(&self) -> Option<&dyn EventReceiver> {
        None
    }
}

/// Capability for receiving published analytics events.
pub trait EventReceiver {
    fn event_did_receive(
        &self,
        name: EventName,
        attributes: &EventAttributes,
    ) -> Result<(), ObserverError>;
}

/// Handle returned when an observer is registered, used to remove it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverHandle(u64);

/// Notification category, used for log context and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverKind {
    Tile,
    Roster,
    Event,
}

impl ObserverKind {
    /// Returns the kind as a string for metric labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ObserverKind::Tile => "tile",
            ObserverKind::Roster => "roster",
            ObserverKind::Event => "event",
        }
    }
}

/// Result of calling a callback on one observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// The observer does not implement the capability being dispatched.
    Skipped,
}

/// Outcome of one dispatch across all registered observers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Engine-owned, ordered collection of observers.
#[derive(Default)]
pub struct ObserverSet {
    next_handle: u64,
    observers: Vec<(ObserverHandle, Arc<dyn SessionObserver>)>,
}

impl ObserverSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. Observers are notified in registration order.
    pub fn add(&mut self, observer: Arc<dyn SessionObserver>) -> ObserverHandle {
        self.next_handle += 1;
        let handle = ObserverHandle(self.next_handle);
        self.observers.push((handle, observer));
        handle
    }

    /// Unregister an observer. Returns `false` if the handle is unknown.
    pub fn remove(&mut self, handle: ObserverHandle) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(h, _)| *h != handle);
        self.observers.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Invoke `notify` on every observer, isolating failures and panics.
    pub fn dispatch<F>(&self, kind: ObserverKind, mut notify: F) -> DispatchReport
    where
        F: FnMut(&dyn SessionObserver) -> Result<Delivery, ObserverError>,
    {
        let mut report = DispatchReport::default();

        for (handle, observer) in &self.observers {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| notify(observer.as_ref())));
            match outcome {
                Ok(Ok(Delivery::Delivered)) => report.delivered += 1,
                Ok(Ok(Delivery::Skipped)) => report.skipped += 1,
                Ok(Err(e)) => {
                    warn!(
                        target: "session.observers",
                        observer = handle.0,
                        kind = kind.as_str(),
                        error = %e,
                        "Observer callback failed"
                    );
                    record_observer_failure(kind.as_str());
                    report.failed += 1;
                }
                Err(_) => {
                    error!(
                        target: "session.observers",
                        observer = handle.0,
                        kind = kind.as_str(),
                        "Observer callback panicked"
                    );
                    record_observer_failure(kind.as_str());
                    report.failed += 1;
                }
            }
        }

        report
    }

    pub(crate) fn tile_updated(
        &self,
        tile_id: TileId,
        previous: Option<&TileState>,
        current: &TileState,
    ) -> DispatchReport {
        self.dispatch(ObserverKind::Tile, |o| {
            o.video_tile_did_update(tile_id, previous, current)
                .map(|()| Delivery::Delivered)
        })
    }

    pub(crate) fn tile_removed(&self, tile_id: TileId) -> DispatchReport {
        self.dispatch(ObserverKind::Tile, |o| {
            o.video_tile_was_removed(tile_id).map(|()| Delivery::Delivered)
        })
    }

    pub(crate) fn roster_updated(&self, roster: &[RosterEntry]) -> DispatchReport {
        self.dispatch(ObserverKind::Roster, |o| {
            o.roster_did_update(roster).map(|()| Delivery::Delivered)
        })
    }

    pub(crate) fn event_received(
        &self,
        name: EventName,
        attributes: &EventAttributes,
    ) -> DispatchReport {
        self.dispatch(ObserverKind::Event, |o| match o.event_receiver() {
            Some(receiver) => receiver
                .event_did_receive(name, attributes)
                .map(|()| Delivery::Delivered),
            None => Ok(Delivery::Skipped),
        })
    }
}
