//! Volume-indicator subscription tracker.

use common::types::AttendeeId;
use session_client::transport::RealtimeSubscriptions;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

/// Subscription call as seen by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionCall {
    Subscribe(AttendeeId),
    Unsubscribe(AttendeeId),
}

/// Records subscribe/unsubscribe calls and the live subscription set.
#[derive(Debug, Clone, Default)]
pub struct MockRealtime {
    inner: Arc<Mutex<MockRealtimeInner>>,
}

#[derive(Debug, Default)]
struct MockRealtimeInner {
    calls: Vec<SubscriptionCall>,
    active: BTreeSet<AttendeeId>,
}

impl MockRealtime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shareable handle for `Collaborators`.
    pub fn as_subscriptions(&self) -> Arc<dyn RealtimeSubscriptions> {
        Arc::new(self.clone())
    }

    pub fn calls(&self) -> Vec<SubscriptionCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Attendees currently subscribed, in id order.
    pub fn active(&self) -> Vec<AttendeeId> {
        self.inner.lock().unwrap().active.iter().cloned().collect()
    }

    pub fn is_subscribed(&self, attendee_id: &AttendeeId) -> bool {
        self.inner.lock().unwrap().active.contains(attendee_id)
    }
}

impl RealtimeSubscriptions for MockRealtime {
    fn subscribe_volume_indicator(&self, attendee_id: &AttendeeId) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .calls
            .push(SubscriptionCall::Subscribe(attendee_id.clone()));
        inner.active.insert(attendee_id.clone());
    }

    fn unsubscribe_volume_indicator(&self, attendee_id: &AttendeeId) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .calls
            .push(SubscriptionCall::Unsubscribe(attendee_id.clone()));
        inner.active.remove(attendee_id);
    }
}
