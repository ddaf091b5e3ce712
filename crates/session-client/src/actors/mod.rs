//! Session actor.
//!
//! One [`SessionActor`] per call owns the [`SessionEngine`](crate::engine::SessionEngine)
//! on a single tokio task. Transport callbacks and application calls reach
//! it through a bounded mailbox, which makes the mailbox the only mutator:
//! messages are applied, and observers notified, strictly in delivery order.

pub mod messages;
pub mod session;

pub use messages::SessionMessage;
pub use session::{SessionActor, SessionActorHandle};
