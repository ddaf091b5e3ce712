//! Fixtures: manual clock, environment probes, config and engine builders.

use common::clock::Clock;
use common::types::AttendeeId;
use session_client::config::SessionConfig;
use session_client::engine::{Collaborators, SessionEngine};
use session_client::errors::ProbeError;
use session_client::roster::{PresenceEvent, VolumeIndicator};
use session_client::system_info::{EnvironmentProbe, HostFacts};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::mock_realtime::MockRealtime;

pub const TEST_MEETING_ID: &str = "meeting-123";
pub const TEST_ATTENDEE_ID: &str = "local-attendee";
pub const TEST_EXTERNAL_USER_ID: &str = "org#local";

/// Clock that only moves when told to.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self(Arc::new(AtomicU64::new(start_ms)))
    }

    pub fn set(&self, now_ms: u64) {
        self.0.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn as_clock(&self) -> Arc<dyn Clock> {
        Arc::new(self.clone())
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Probe returning fixed host facts.
#[derive(Debug, Clone, Default)]
pub struct FixedProbe(pub HostFacts);

impl FixedProbe {
    pub fn linux() -> Self {
        Self(HostFacts {
            os_name: Some("Linux".to_string()),
            os_version: Some("6.1".to_string()),
            device_vendor: Some("GenuineIntel".to_string()),
            device_model: Some("Xeon".to_string()),
        })
    }
}

impl EnvironmentProbe for FixedProbe {
    fn probe(&self) -> Result<HostFacts, ProbeError> {
        Ok(self.0.clone())
    }
}

/// Probe that always errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingProbe;

impl EnvironmentProbe for FailingProbe {
    fn probe(&self) -> Result<HostFacts, ProbeError> {
        Err(ProbeError::Unavailable("introspection disabled".to_string()))
    }
}

/// Probe that panics.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingProbe;

impl EnvironmentProbe for PanickingProbe {
    fn probe(&self) -> Result<HostFacts, ProbeError> {
        panic!("introspection exploded")
    }
}

/// Configuration variables for a test session.
pub fn test_vars() -> HashMap<String, String> {
    [
        ("SESSION_MEETING_ID", TEST_MEETING_ID),
        ("SESSION_ATTENDEE_ID", TEST_ATTENDEE_ID),
        ("SESSION_EXTERNAL_USER_ID", TEST_EXTERNAL_USER_ID),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

pub fn test_config() -> SessionConfig {
    SessionConfig::from_vars(&test_vars()).expect("test config must be valid")
}

/// Collaborators wired to the given mocks and a fixed probe.
pub fn test_collaborators(realtime: &MockRealtime, clock: &ManualClock) -> Collaborators {
    Collaborators::new(realtime.as_subscriptions())
        .with_clock(clock.as_clock())
        .with_probe(Box::new(FixedProbe::linux()))
}

pub fn test_engine(realtime: &MockRealtime, clock: &ManualClock) -> SessionEngine {
    SessionEngine::new(test_config(), test_collaborators(realtime, clock))
}

pub fn present(attendee_id: &str, external_user_id: &str) -> PresenceEvent {
    PresenceEvent {
        attendee_id: AttendeeId::new(attendee_id),
        present: true,
        external_user_id: external_user_id.to_string(),
        dropped: false,
    }
}

pub fn absent(attendee_id: &str) -> PresenceEvent {
    PresenceEvent {
        attendee_id: AttendeeId::new(attendee_id),
        present: false,
        external_user_id: String::new(),
        dropped: false,
    }
}

pub fn indicator(
    attendee_id: &str,
    volume: Option<f64>,
    muted: Option<bool>,
    signal_strength: Option<f64>,
) -> VolumeIndicator {
    VolumeIndicator {
        attendee_id: AttendeeId::new(attendee_id),
        volume,
        muted,
        signal_strength,
    }
}
