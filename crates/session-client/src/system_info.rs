//! Host introspection for the event attribute snapshot.
//!
//! The snapshot is captured once when the engine is built. Introspection is
//! best effort: a probe that fails or panics degrades every field to
//! [`UNAVAILABLE`] and the engine starts anyway.

use std::panic::{self, AssertUnwindSafe};
use sysinfo::System;
use tracing::{debug, error};

use crate::errors::ProbeError;
use crate::events::{EnvironmentSnapshot, UNAVAILABLE};

/// Raw host facts. `None` means the host did not report the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostFacts {
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub device_vendor: Option<String>,
    pub device_model: Option<String>,
}

/// Source of host facts.
pub trait EnvironmentProbe: Send + Sync {
    fn probe(&self) -> Result<HostFacts, ProbeError>;
}

/// Probe backed by `sysinfo`. CPU vendor and brand stand in for the device
/// vendor and model.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl EnvironmentProbe for SystemProbe {
    fn probe(&self) -> Result<HostFacts, ProbeError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(ProbeError::Unavailable(
                "sysinfo does not support this platform".to_string(),
            ));
        }

        let mut sys = System::new();
        sys.refresh_cpu();
        let cpu = sys.cpus().first();

        Ok(HostFacts {
            os_name: System::name(),
            os_version: System::os_version(),
            device_vendor: cpu.map(|c| c.vendor_id().to_string()),
            device_model: cpu.map(|c| c.brand().trim().to_string()),
        })
    }
}

/// Build the environment snapshot from a probe and the configured agent.
///
/// Never fails: probe errors and panics are logged and degrade to
/// [`EnvironmentSnapshot::unavailable`] host fields.
#[must_use]
pub fn capture_snapshot(
    probe: &dyn EnvironmentProbe,
    agent_name: Option<&str>,
    agent_version: Option<&str>,
) -> EnvironmentSnapshot {
    let facts = match panic::catch_unwind(AssertUnwindSafe(|| probe.probe())) {
        Ok(Ok(facts)) => facts,
        Ok(Err(e)) => {
            error!(target: "session.events", error = %e, "Environment probe failed");
            HostFacts::default()
        }
        Err(_) => {
            error!(target: "session.events", "Environment probe panicked");
            HostFacts::default()
        }
    };

    let snapshot = EnvironmentSnapshot {
        agent_name: or_unavailable(agent_name),
        agent_version: or_unavailable(agent_version),
        agent_major_version: or_unavailable(agent_version.and_then(|v| v.split('.').next())),
        device_name: device_name(facts.device_vendor.as_deref(), facts.device_model.as_deref()),
        os_name: or_unavailable(facts.os_name.as_deref()),
        os_version: or_unavailable(facts.os_version.as_deref()),
    };
    debug!(target: "session.events", snapshot = ?snapshot, "Environment snapshot captured");
    snapshot
}

fn or_unavailable(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNAVAILABLE.to_string(),
    }
}

fn device_name(vendor: Option<&str>, model: Option<&str>) -> String {
    let joined = format!("{} {}", vendor.unwrap_or(""), model.unwrap_or(""));
    or_unavailable(Some(joined.trim()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    struct Fixed(HostFacts);

    impl EnvironmentProbe for Fixed {
        fn probe(&self) -> Result<HostFacts, ProbeError> {
            Ok(self.0.clone())
        }
    }

    struct Broken;

    impl EnvironmentProbe for Broken {
        fn probe(&self) -> Result<HostFacts, ProbeError> {
            Err(ProbeError::Unavailable("sandboxed".to_string()))
        }
    }

    struct Exploding;

    impl EnvironmentProbe for Exploding {
        fn probe(&self) -> Result<HostFacts, ProbeError> {
            panic!("introspection blew up");
        }
    }

    #[test]
    fn test_snapshot_from_facts() {
        let probe = Fixed(HostFacts {
            os_name: Some("Linux".to_string()),
            os_version: Some("6.1".to_string()),
            device_vendor: Some("GenuineIntel".to_string()),
            device_model: Some("Xeon".to_string()),
        });

        let snapshot = capture_snapshot(&probe, Some("replay"), Some("2.14.1"));

        assert_eq!(snapshot.agent_name, "replay");
        assert_eq!(snapshot.agent_version, "2.14.1");
        assert_eq!(snapshot.agent_major_version, "2");
        assert_eq!(snapshot.device_name, "GenuineIntel Xeon");
        assert_eq!(snapshot.os_name, "Linux");
        assert_eq!(snapshot.os_version, "6.1");
    }

    #[test]
    fn test_partial_device_name_is_trimmed() {
        let probe = Fixed(HostFacts {
            device_model: Some("M2".to_string()),
            ..HostFacts::default()
        });
        let snapshot = capture_snapshot(&probe, None, None);
        assert_eq!(snapshot.device_name, "M2");
        assert_eq!(snapshot.os_name, UNAVAILABLE);
        assert_eq!(snapshot.agent_major_version, UNAVAILABLE);
    }

    #[test]
    fn test_probe_error_degrades_to_unavailable() {
        let snapshot = capture_snapshot(&Broken, None, None);
        assert_eq!(snapshot, EnvironmentSnapshot::unavailable());
    }

    #[test]
    fn test_probe_panic_degrades_to_unavailable() {
        let snapshot = capture_snapshot(&Exploding, Some("agent"), None);
        assert_eq!(snapshot.agent_name, "agent");
        assert_eq!(snapshot.os_name, UNAVAILABLE);
        assert_eq!(snapshot.device_name, UNAVAILABLE);
    }

    #[test]
    fn test_system_probe_never_fails_capture() {
        let snapshot = capture_snapshot(&SystemProbe, None, None);
        assert!(!snapshot.os_name.is_empty());
        assert!(!snapshot.device_name.is_empty());
    }
}
