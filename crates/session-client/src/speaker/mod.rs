//! Active-speaker ranking.
//!
//! A pluggable [`ActiveSpeakerPolicy`] turns raw per-attendee audio samples
//! into continuous scores. The [`ActiveSpeakerDetector`] owns the policy,
//! ranks attendees by score, and reports the ranked list when it changes
//! and the score map at a configured cadence.
//!
//! Which of the ranked attendees gets highlighted is decided by the roster,
//! not here.

pub mod detector;
pub mod policy;

pub use detector::{ActiveSpeakerDetector, SpeakerUpdate};
pub use policy::{ActiveSpeakerPolicy, DefaultActiveSpeakerPolicy};
