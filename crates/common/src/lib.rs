//! Common utilities and types shared across session components.

#![warn(clippy::pedantic)]

/// Module for common data types
pub mod types;

/// Module for the wall clock abstraction used to stamp history and events
pub mod clock;
