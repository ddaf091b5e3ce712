//! # Session Test Utilities
//!
//! Shared test utilities for the session client.
//!
//! This crate provides mock collaborators and fixtures for driving the
//! session engine without a real media transport.
//!
//! ## Modules
//!
//! - `mock_observer` - Recording and failing observers
//! - `mock_realtime` - Volume-indicator subscription tracker
//! - `mock_stream` - Media stream handle that counts releases
//! - `fixtures` - Manual clock, environment probes, config and engine builders
//!
//! ## Usage
//!
//! ```rust,ignore
//! use session_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let realtime = MockRealtime::new();
//!     let clock = ManualClock::new(1_000);
//!     let mut engine = test_engine(&realtime, &clock);
//!
//!     let observer = RecordingObserver::new();
//!     engine.add_observer(observer.clone());
//!
//!     let tile = engine.add_video_tile();
//!     assert_eq!(observer.tile_updates().len(), 1);
//! }
//! ```

pub mod fixtures;
pub mod mock_observer;
pub mod mock_realtime;
pub mod mock_stream;

pub use fixtures::*;
pub use mock_observer::*;
pub use mock_realtime::*;
pub use mock_stream::*;
