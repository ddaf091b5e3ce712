//! Session Client Library
//!
//! Client-side state engine for one live call. It owns:
//!
//! - The video tile registry: bindings between an attendee, a media stream
//!   and a render target, with id allocation and lifecycle rules
//! - The roster: per-attendee presence, volume, mute, signal strength and
//!   active-speaker state merged from independently arriving callbacks
//! - Active-speaker ranking behind a pluggable scoring policy
//! - The meeting history log used to stamp outgoing analytics events
//!
//! # Architecture
//!
//! ```text
//! SessionActor (one per call)
//! └── owns SessionEngine (single mutator, synchronous)
//!     ├── TileRegistry
//!     ├── RosterAggregator
//!     │   └── ActiveSpeakerDetector
//!     │       └── dyn ActiveSpeakerPolicy
//!     ├── EventTracker
//!     └── ObserverSet
//! ```
//!
//! Transport callbacks and application calls are funnelled through the
//! actor's mailbox, so state transitions are applied, and observers are
//! notified, in exactly the order they were delivered.
//!
//! # Modules
//!
//! - [`actors`] - Session actor and its message types
//! - [`config`] - Session configuration from environment
//! - [`engine`] - Synchronous engine composing all components
//! - [`errors`] - Error types
//! - [`events`] - Meeting history and event publication
//! - [`observability`] - Metrics
//! - [`observers`] - Observer trait and engine-owned observer collection
//! - [`replay`] - Replay of recorded transport callbacks
//! - [`roster`] - Roster aggregation
//! - [`speaker`] - Active-speaker policy and detector
//! - [`system_info`] - Host introspection for event attributes
//! - [`tiles`] - Video tile registry
//! - [`transport`] - Interfaces consumed from the media/transport layer

pub mod actors;
pub mod config;
pub mod engine;
pub mod errors;
pub mod events;
pub mod observability;
pub mod observers;
pub mod replay;
pub mod roster;
pub mod speaker;
pub mod system_info;
pub mod tiles;
pub mod transport;
