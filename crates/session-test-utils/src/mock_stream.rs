//! Media stream handle that counts releases.

use session_client::transport::MediaStream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Stream handle whose drop increments a shared counter.
#[derive(Debug)]
pub struct MockStream {
    id: String,
    released: Arc<AtomicUsize>,
}

impl MockStream {
    /// Create a stream plus the counter that observes its release.
    pub fn new(id: impl Into<String>) -> (Box<Self>, ReleaseCounter) {
        let released = Arc::new(AtomicUsize::new(0));
        let stream = Box::new(Self {
            id: id.into(),
            released: Arc::clone(&released),
        });
        (stream, ReleaseCounter(released))
    }

    /// Create a stream that shares an existing counter.
    pub fn with_counter(id: impl Into<String>, counter: &ReleaseCounter) -> Box<Self> {
        Box::new(Self {
            id: id.into(),
            released: Arc::clone(&counter.0),
        })
    }
}

impl MediaStream for MockStream {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for MockStream {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Number of [`MockStream`]s released so far.
#[derive(Debug, Clone, Default)]
pub struct ReleaseCounter(Arc<AtomicUsize>);

impl ReleaseCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
