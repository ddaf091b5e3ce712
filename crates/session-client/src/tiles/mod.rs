//! Video tile registry.
//!
//! A tile binds one attendee's video stream to a render target. The
//! registry allocates tile ids, enforces the single-local-tile and
//! one-tile-per-render-target rules, and notifies observers on every
//! committed change.
//!
//! ```text
//! created ──bind/unbind stream & target (any number of times)──┐
//!    │                                                          │
//!    └──────────────► active ⇄ paused ─────────────────► removed (terminal)
//!
//! poor_connection: orthogonal flag, settable in any non-terminal state
//! ```

pub mod registry;
pub mod tile;

pub use registry::TileRegistry;
pub use tile::{StreamBinding, TileState};
