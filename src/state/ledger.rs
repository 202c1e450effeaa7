use std::collections::HashMap;

use uuid::Uuid;

use crate::error::ServiceError;

/// Floor for the speed factor: even a last-instant correct answer keeps 30%
/// of the base points.
const MIN_SPEED_FACTOR: f64 = 0.3;

/// One scored submission for a (player, round) pair.
#[derive(Debug, Clone)]
pub struct ScoreEntry {
    /// The option the player picked.
    pub choice: String,
    /// Whether the choice matched the question's recorded answer.
    pub correct: bool,
    /// Points awarded under the speed-weighted policy.
    pub points: u32,
    /// Server time at which the submission was accepted.
    pub received_at_ms: u64,
}

/// Per-room record of accepted submissions and derived totals.
///
/// At most one entry exists per (player, round); duplicates are rejected,
/// never overwritten.
#[derive(Debug, Default)]
pub struct ScoreLedger {
    entries: HashMap<(Uuid, usize), ScoreEntry>,
}

impl ScoreLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted submission, rejecting duplicates for the same
    /// (player, round).
    pub fn record(
        &mut self,
        player_id: Uuid,
        round_index: usize,
        entry: ScoreEntry,
    ) -> Result<&ScoreEntry, ServiceError> {
        match self.entries.entry((player_id, round_index)) {
            std::collections::hash_map::Entry::Occupied(_) => Err(ServiceError::AlreadyAnswered),
            std::collections::hash_map::Entry::Vacant(slot) => Ok(slot.insert(entry)),
        }
    }

    /// Whether a submission was already accepted for this (player, round).
    pub fn has_entry(&self, player_id: Uuid, round_index: usize) -> bool {
        self.entries.contains_key(&(player_id, round_index))
    }

    /// Cumulative score for one player across all rounds.
    pub fn total(&self, player_id: Uuid) -> u32 {
        self.entries
            .iter()
            .filter(|((id, _), _)| *id == player_id)
            .map(|(_, entry)| entry.points)
            .sum()
    }

    /// Number of accepted submissions across all players and rounds.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no submission has been accepted yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Speed-weighted points for a submission.
///
/// Incorrect answers score zero. Correct answers score
/// `base_points * max(0.3, 1 - latency / limit)`, rounded; a faster correct
/// answer therefore never scores less than a slower one, and the result is
/// fully determined by the inputs.
pub fn compute_points(correct: bool, base_points: u32, time_limit_secs: u32, latency_ms: u64) -> u32 {
    if !correct {
        return 0;
    }
    let limit_ms = f64::from(time_limit_secs.max(1)) * 1000.0;
    let factor = (1.0 - latency_ms as f64 / limit_ms).max(MIN_SPEED_FACTOR);
    (f64::from(base_points) * factor).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(points: u32) -> ScoreEntry {
        ScoreEntry {
            choice: "A".into(),
            correct: points > 0,
            points,
            received_at_ms: 0,
        }
    }

    #[test]
    fn score_is_zero_when_wrong() {
        assert_eq!(compute_points(false, 1000, 10, 100), 0);
    }

    #[test]
    fn score_decreases_with_latency_but_has_floor() {
        let fast = compute_points(true, 1000, 10, 100);
        let slow = compute_points(true, 1000, 10, 9000);
        let very_slow = compute_points(true, 1000, 10, 999_999);
        assert!(fast > slow);
        assert_eq!(very_slow, 300);
    }

    #[test]
    fn instant_answer_scores_full_base() {
        assert_eq!(compute_points(true, 1000, 15, 0), 1000);
    }

    #[test]
    fn zero_time_limit_does_not_divide_by_zero() {
        assert_eq!(compute_points(true, 1000, 0, 500), 500);
    }

    #[test]
    fn duplicate_submissions_are_rejected_not_overwritten() {
        let mut ledger = ScoreLedger::new();
        let player = Uuid::new_v4();

        ledger.record(player, 0, entry(700)).unwrap();
        let err = ledger.record(player, 0, entry(1000)).unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyAnswered));

        // The first entry stays authoritative.
        assert_eq!(ledger.total(player), 700);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn totals_sum_across_rounds_per_player() {
        let mut ledger = ScoreLedger::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        ledger.record(alice, 0, entry(500)).unwrap();
        ledger.record(alice, 1, entry(300)).unwrap();
        ledger.record(bob, 0, entry(0)).unwrap();

        assert_eq!(ledger.total(alice), 800);
        assert_eq!(ledger.total(bob), 0);
        assert_eq!(ledger.total(Uuid::new_v4()), 0);
    }

    #[test]
    fn same_player_may_answer_every_round_once() {
        let mut ledger = ScoreLedger::new();
        let player = Uuid::new_v4();

        for round in 0..3 {
            ledger.record(player, round, entry(100)).unwrap();
        }
        assert!(ledger.has_entry(player, 2));
        assert!(!ledger.has_entry(player, 3));
        assert_eq!(ledger.total(player), 300);
    }
}
