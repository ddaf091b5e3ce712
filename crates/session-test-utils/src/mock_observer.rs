//! Observers for asserting on session notifications.
//!
//! [`RecordingObserver`] keeps every notification in delivery order.
//! [`FailingObserver`] returns an error, or panics, from every callback so
//! tests can check that one bad observer does not starve the others.

use common::types::TileId;
use session_client::errors::ObserverError;
use session_client::events::{EventAttributes, EventName};
use session_client::observers::{EventReceiver, SessionObserver};
use session_client::roster::RosterEntry;
use session_client::tiles::TileState;
use std::sync::{Arc, Mutex};

/// One recorded notification.
#[derive(Debug, Clone)]
pub enum Notification {
    TileUpdated {
        tile_id: TileId,
        previous: Option<TileState>,
        current: TileState,
    },
    TileRemoved {
        tile_id: TileId,
    },
    RosterUpdated {
        roster: Vec<RosterEntry>,
    },
    Event {
        name: EventName,
        attributes: EventAttributes,
    },
}

/// Observer that records every notification, including events.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    notifications: Mutex<Vec<Notification>>,
    receive_events: bool,
}

impl RecordingObserver {
    /// Recorder that also implements the event capability.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            notifications: Mutex::new(Vec::new()),
            receive_events: true,
        })
    }

    /// Recorder without the event capability; publishes skip it.
    pub fn without_events() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.notifications.lock().unwrap().clear();
    }

    pub fn tile_updates(&self) -> Vec<(TileId, Option<TileState>, TileState)> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::TileUpdated {
                    tile_id,
                    previous,
                    current,
                } => Some((tile_id, previous, current)),
                _ => None,
            })
            .collect()
    }

    pub fn tile_removals(&self) -> Vec<TileId> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::TileRemoved { tile_id } => Some(tile_id),
                _ => None,
            })
            .collect()
    }

    pub fn roster_updates(&self) -> Vec<Vec<RosterEntry>> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::RosterUpdated { roster } => Some(roster),
                _ => None,
            })
            .collect()
    }

    /// Most recent roster view, panicking if none was delivered.
    pub fn last_roster(&self) -> Vec<RosterEntry> {
        self.roster_updates()
            .pop()
            .expect("no roster update recorded")
    }

    pub fn events(&self) -> Vec<(EventName, EventAttributes)> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Event { name, attributes } => Some((name, attributes)),
                _ => None,
            })
            .collect()
    }

    fn push(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

impl SessionObserver for RecordingObserver {
    fn video_tile_did_update(
        &self,
        tile_id: TileId,
        previous: Option<&TileState>,
        current: &TileState,
    ) -> Result<(), ObserverError> {
        self.push(Notification::TileUpdated {
            tile_id,
            previous: previous.cloned(),
            current: current.clone(),
        });
        Ok(())
    }

    fn video_tile_was_removed(&self, tile_id: TileId) -> Result<(), ObserverError> {
        self.push(Notification::TileRemoved { tile_id });
        Ok(())
    }

    fn roster_did_update(&self, roster: &[RosterEntry]) -> Result<(), ObserverError> {
        self.push(Notification::RosterUpdated {
            roster: roster.to_vec(),
        });
        Ok(())
    }

    fn event_receiver(&self) -> Option<&dyn EventReceiver> {
        if self.receive_events {
            Some(self)
        } else {
            None
        }
    }
}

impl EventReceiver for RecordingObserver {
    fn event_did_receive(
        &self,
        name: EventName,
        attributes: &EventAttributes,
    ) -> Result<(), ObserverError> {
        self.push(Notification::Event {
            name,
            attributes: attributes.clone(),
        });
        Ok(())
    }
}

/// How a [`FailingObserver`] misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    ReturnError,
    Panic,
}

/// Observer whose every callback fails.
#[derive(Debug)]
pub struct FailingObserver {
    mode: FailureMode,
}

impl FailingObserver {
    pub fn returning_error() -> Arc<Self> {
        Arc::new(Self {
            mode: FailureMode::ReturnError,
        })
    }

    pub fn panicking() -> Arc<Self> {
        Arc::new(Self {
            mode: FailureMode::Panic,
        })
    }

    fn fail(&self, what: &str) -> Result<(), ObserverError> {
        match self.mode {
            FailureMode::ReturnError => Err(ObserverError::Failed(format!("{what} failed"))),
            FailureMode::Panic => panic!("{what} panicked"),
        }
    }
}

impl SessionObserver for FailingObserver {
    fn video_tile_did_update(
        &self,
        _tile_id: TileId,
        _previous: Option<&TileState>,
        _current: &TileState,
    ) -> Result<(), ObserverError> {
        self.fail("tile update")
    }

    fn video_tile_was_removed(&self, _tile_id: TileId) -> Result<(), ObserverError> {
        self.fail("tile removal")
    }

    fn roster_did_update(&self, _roster: &[RosterEntry]) -> Result<(), ObserverError> {
        self.fail("roster update")
    }

    fn event_receiver(&self) -> Option<&dyn EventReceiver> {
        Some(self)
    }
}

impl EventReceiver for FailingObserver {
    fn event_did_receive(
        &self,
        _name: EventName,
        _attributes: &EventAttributes,
    ) -> Result<(), ObserverError> {
        self.fail("event")
    }
}
