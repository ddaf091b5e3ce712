//! Active-speaker scoring policies.

use common::types::AttendeeId;
use std::collections::HashMap;

/// Scoring policy consulted on every audio sample.
pub trait ActiveSpeakerPolicy: Send {
    /// Fold one sample into the policy and return the attendee's new score.
    ///
    /// `volume` is a fraction in `[0.0, 1.0]`; `None` or `muted == Some(true)`
    /// count as silence.
    fn calculate_score(
        &mut self,
        attendee_id: &AttendeeId,
        volume: Option<f64>,
        muted: Option<bool>,
    ) -> f64;

    /// Whether video send bandwidth should favour the active speaker.
    fn prioritize_video_send_bandwidth_for_active_speaker(&self) -> bool;

    /// Forget any state kept for an attendee who left.
    fn remove_attendee(&mut self, _attendee_id: &AttendeeId) {}
}

/// Weight of an attendee's previous score in the smoothed score.
pub const DEFAULT_SPEAKER_WEIGHT: f64 = 0.9;
/// Scores below this are reported as zero.
pub const DEFAULT_CUTOFF_THRESHOLD: f64 = 0.01;
/// Volumes at or below this count as silence.
pub const DEFAULT_SILENCE_THRESHOLD: f64 = 0.2;
/// How fast a new speaker erodes everyone else's score.
pub const DEFAULT_TAKEOVER_RATE: f64 = 0.2;

/// Exponentially smoothed speaking score with takeover.
///
/// Each sample is binarised against the silence threshold and blended into
/// the attendee's running score. While an attendee speaks, every other
/// attendee's running score decays by `takeover_rate`.
#[derive(Debug, Clone)]
pub struct DefaultActiveSpeakerPolicy {
    speaker_weight: f64,
    cutoff_threshold: f64,
    silence_threshold: f64,
    takeover_rate: f64,
    volumes: HashMap<AttendeeId, f64>,
}

impl Default for DefaultActiveSpeakerPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_SPEAKER_WEIGHT,
            DEFAULT_CUTOFF_THRESHOLD,
            DEFAULT_SILENCE_THRESHOLD,
            DEFAULT_TAKEOVER_RATE,
        )
    }
}

impl DefaultActiveSpeakerPolicy {
    #[must_use]
    pub fn new(
        speaker_weight: f64,
        cutoff_threshold: f64,
        silence_threshold: f64,
        takeover_rate: f64,
    ) -> Self {
        Self {
            speaker_weight,
            cutoff_threshold,
            silence_threshold,
            takeover_rate,
            volumes: HashMap::new(),
        }
    }
}

impl ActiveSpeakerPolicy for DefaultActiveSpeakerPolicy {
    fn calculate_score(
        &mut self,
        attendee_id: &AttendeeId,
        volume: Option<f64>,
        muted: Option<bool>,
    ) -> f64 {
        let raw = match (volume, muted) {
            (_, Some(true)) | (None, _) => 0.0,
            (Some(v), _) => v,
        };
        let speaking = if raw > self.silence_threshold { 1.0 } else { 0.0 };

        let previous = self.volumes.get(attendee_id).copied().unwrap_or(0.0);
        let score = previous * self.speaker_weight + speaking * (1.0 - self.speaker_weight);
        self.volumes.insert(attendee_id.clone(), score);

        for (other, other_score) in &mut self.volumes {
            if other != attendee_id {
                *other_score = (*other_score - self.takeover_rate * speaking).max(0.0);
            }
        }

        if score < self.cutoff_threshold {
            0.0
        } else {
            score
        }
    }

    fn prioritize_video_send_bandwidth_for_active_speaker(&self) -> bool {
        true
    }

    fn remove_attendee(&mut self, attendee_id: &AttendeeId) {
        self.volumes.remove(attendee_id);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn id(s: &str) -> AttendeeId {
        AttendeeId::new(s)
    }

    #[test]
    fn test_speaking_raises_score_gradually() {
        let mut policy = DefaultActiveSpeakerPolicy::default();

        let first = policy.calculate_score(&id("a"), Some(0.8), Some(false));
        let second = policy.calculate_score(&id("a"), Some(0.8), Some(false));

        assert!((first - 0.1).abs() < 1e-9);
        assert!(second > first);
    }

    #[test]
    fn test_silence_and_mute_score_zero() {
        let mut policy = DefaultActiveSpeakerPolicy::default();

        assert_eq!(policy.calculate_score(&id("a"), Some(0.1), None), 0.0);
        assert_eq!(policy.calculate_score(&id("a"), Some(0.9), Some(true)), 0.0);
        assert_eq!(policy.calculate_score(&id("a"), None, None), 0.0);
    }

    #[test]
    fn test_score_decays_below_cutoff() {
        let mut policy = DefaultActiveSpeakerPolicy::default();
        policy.calculate_score(&id("a"), Some(1.0), None);

        let mut score = 1.0;
        for _ in 0..100 {
            score = policy.calculate_score(&id("a"), Some(0.0), None);
        }
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_new_speaker_takes_over() {
        let mut policy = DefaultActiveSpeakerPolicy::default();
        for _ in 0..10 {
            policy.calculate_score(&id("a"), Some(1.0), None);
        }
        let a_before = policy.volumes[&id("a")];

        policy.calculate_score(&id("b"), Some(1.0), None);

        let a_after = policy.volumes[&id("a")];
        assert!((a_before - a_after - DEFAULT_TAKEOVER_RATE).abs() < 1e-9);
    }

    #[test]
    fn test_remove_attendee_forgets_score() {
        let mut policy = DefaultActiveSpeakerPolicy::default();
        policy.calculate_score(&id("a"), Some(1.0), None);
        policy.remove_attendee(&id("a"));

        let fresh = policy.calculate_score(&id("a"), Some(1.0), None);
        assert!((fresh - 0.1).abs() < 1e-9);
        assert!(policy.prioritize_video_send_bandwidth_for_active_speaker());
    }
}
