//! `ActiveSpeakerDetector` - ranks attendees using a pluggable policy.

use common::types::AttendeeId;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::trace;

use super::policy::ActiveSpeakerPolicy;

/// What changed after the detector consumed a sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeakerUpdate {
    /// New ranked list, most active first. `None` if unchanged.
    pub active_speakers: Option<Vec<AttendeeId>>,
    /// Current scores for every tracked attendee. `None` if not due.
    pub scores: Option<BTreeMap<AttendeeId, f64>>,
}

impl SpeakerUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active_speakers.is_none() && self.scores.is_none()
    }
}

/// Ranks attendees by speaking activity.
pub struct ActiveSpeakerDetector {
    policy: Box<dyn ActiveSpeakerPolicy>,
    scores: BTreeMap<AttendeeId, f64>,
    active_speakers: Vec<AttendeeId>,
    /// Score reporting cadence; zero disables score reporting.
    score_interval_ms: u64,
    last_scores_at_ms: Option<u64>,
}

impl ActiveSpeakerDetector {
    #[must_use]
    pub fn new(policy: Box<dyn ActiveSpeakerPolicy>, score_interval_ms: u64) -> Self {
        Self {
            policy,
            scores: BTreeMap::new(),
            active_speakers: Vec::new(),
            score_interval_ms,
            last_scores_at_ms: None,
        }
    }

    /// Score reporting interval, or `None` when scoring is disabled.
    #[must_use]
    pub fn score_interval(&self) -> Option<Duration> {
        (self.score_interval_ms > 0).then(|| Duration::from_millis(self.score_interval_ms))
    }

    #[must_use]
    pub fn active_speakers(&self) -> &[AttendeeId] {
        &self.active_speakers
    }

    #[must_use]
    pub fn policy(&self) -> &dyn ActiveSpeakerPolicy {
        self.policy.as_ref()
    }

    /// Fold one audio sample into the ranking.
    pub fn observe(
        &mut self,
        attendee_id: &AttendeeId,
        volume: Option<f64>,
        muted: Option<bool>,
        now_ms: u64,
    ) -> SpeakerUpdate {
        let score = self.policy.calculate_score(attendee_id, volume, muted);
        self.scores.insert(attendee_id.clone(), score);

        trace!(
            target: "session.speaker",
            attendee_id = %attendee_id,
            score,
            "Speaker sample scored"
        );

        SpeakerUpdate {
            active_speakers: self.rerank(),
            scores: self.tick(now_ms),
        }
    }

    /// Emit the score map if the reporting interval has elapsed.
    pub fn tick(&mut self, now_ms: u64) -> Option<BTreeMap<AttendeeId, f64>> {
        if self.score_interval_ms == 0 {
            return None;
        }
        let due = self
            .last_scores_at_ms
            .map_or(true, |last| now_ms.saturating_sub(last) >= self.score_interval_ms);
        if !due {
            return None;
        }
        self.last_scores_at_ms = Some(now_ms);
        Some(self.scores.clone())
    }

    /// Emit the score map unconditionally, for a caller-owned timer.
    ///
    /// Returns `None` while scoring is disabled or nothing has been scored.
    pub fn flush(&mut self, now_ms: u64) -> Option<BTreeMap<AttendeeId, f64>> {
        if self.score_interval_ms == 0 || self.scores.is_empty() {
            return None;
        }
        self.last_scores_at_ms = Some(now_ms);
        Some(self.scores.clone())
    }

    /// Stop tracking an attendee. Returns the new ranked list if it changed.
    pub fn remove_attendee(&mut self, attendee_id: &AttendeeId) -> Option<Vec<AttendeeId>> {
        self.policy.remove_attendee(attendee_id);
        self.scores.remove(attendee_id);
        self.rerank()
    }

    /// Forget every attendee.
    pub fn reset(&mut self) {
        for attendee_id in self.scores.keys() {
            self.policy.remove_attendee(attendee_id);
        }
        self.scores.clear();
        self.active_speakers.clear();
        self.last_scores_at_ms = None;
    }

    /// Recompute the ranked list; returns it only if it changed.
    fn rerank(&mut self) -> Option<Vec<AttendeeId>> {
        let mut ranked: Vec<(&AttendeeId, f64)> = self
            .scores
            .iter()
            .filter(|(_, score)| **score > 0.0)
            .map(|(id, score)| (id, *score))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let ranked: Vec<AttendeeId> = ranked.into_iter().map(|(id, _)| id.clone()).collect();

        if ranked == self.active_speakers {
            return None;
        }
        self.active_speakers.clone_from(&ranked);
        Some(ranked)
    }
}
