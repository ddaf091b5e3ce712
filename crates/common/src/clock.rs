//! Wall clock used to stamp meeting history and published events.
//!
//! History timestamps must never go backwards, even if the host's wall
//! clock is stepped. [`SystemClock`] clamps each reading to the largest
//! value it has already handed out, so ties are possible but regressions
//! are not.

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of millisecond wall-clock timestamps.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// Wall clock backed by `chrono::Utc`, clamped to be non-decreasing.
#[derive(Debug, Default)]
pub struct SystemClock {
    last_ms: AtomicU64,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        let wall = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        let previous = self.last_ms.fetch_max(wall, Ordering::Relaxed);
        previous.max(wall)
    }
}
