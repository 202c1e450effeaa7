use indexmap::IndexMap;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{
    bank::Question,
    error::ServiceError,
    state::{
        ledger::{ScoreEntry, ScoreLedger, compute_points},
        state_machine::{RoomEvent, RoomPhase, RoomStateMachine, RoundStatus},
    },
};

/// Player info tracked during a room's lifetime.
#[derive(Debug, Clone)]
pub struct Player {
    /// Server-issued identifier, unique within the room.
    pub id: Uuid,
    /// Display name chosen by the player; not required to be unique.
    pub nickname: String,
}

/// One timed question instance within a room.
#[derive(Debug, Clone)]
pub struct Round {
    /// Zero-based position in the room's question sequence.
    pub index: usize,
    /// Identifier of the question bound to this round.
    pub question_id: u64,
    /// Server time at which the round opened.
    pub opened_at_ms: u64,
    /// Server time at which submissions stop being accepted.
    pub closes_at_ms: u64,
    /// Set once the close transition ran; rounds are never reopened.
    pub closed: bool,
}

/// Public projection of an open round handed to DTO conversions.
#[derive(Debug, Clone)]
pub struct RoundView {
    /// Zero-based round index.
    pub index: usize,
    /// Total questions bound to the room.
    pub total: usize,
    /// The question being asked.
    pub question: Question,
    /// Server time at which the round opened.
    pub opened_at_ms: u64,
    /// Server time at which the round closes.
    pub closes_at_ms: u64,
}

/// Outcome of closing a round, feeding the reveal broadcast.
#[derive(Debug, Clone)]
pub struct ClosedRound {
    /// Index of the round that closed.
    pub index: usize,
    /// The question that was asked, including its recorded answer.
    pub question: Question,
    /// Close time carried by the round.
    pub closed_at_ms: u64,
}

/// Result of a host `next` call: the lazily closed round (if the deadline
/// had passed unobserved) and the newly opened round, or `None` when the
/// sequence is exhausted and the room finished.
#[derive(Debug)]
pub struct AdvanceOutcome {
    /// Round closed as a side effect of observing an elapsed deadline.
    pub closed: Option<ClosedRound>,
    /// The next round, absent when the room transitioned to finished.
    pub opened: Option<RoundView>,
}

/// One row of the leaderboard, already ranked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    /// Player the row belongs to.
    pub player_id: Uuid,
    /// Display name at join time.
    pub nickname: String,
    /// Cumulative score across all closed and open rounds.
    pub total_score: u32,
}

/// Per-room state: players, bound questions, the current round window, and
/// the score ledger. All mutation happens under the owning room's lock, so
/// the session itself is free of interior synchronization.
#[derive(Debug)]
pub struct RoomSession {
    machine: RoomStateMachine,
    players: IndexMap<Uuid, Player>,
    questions: Vec<Question>,
    current_round: Option<Round>,
    ledger: ScoreLedger,
    last_activity_ms: u64,
    deadline_task: Option<JoinHandle<()>>,
}

impl RoomSession {
    /// Build a fresh session in the waiting state.
    pub fn new(created_at_ms: u64) -> Self {
        Self {
            machine: RoomStateMachine::new(),
            players: IndexMap::new(),
            questions: Vec::new(),
            current_round: None,
            ledger: ScoreLedger::new(),
            last_activity_ms: created_at_ms,
            deadline_task: None,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> RoomPhase {
        self.machine.phase()
    }

    /// Number of players that have joined.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Players in join order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Server time of the last accepted operation on this room.
    pub fn last_activity_ms(&self) -> u64 {
        self.last_activity_ms
    }

    /// Record activity so idle eviction does not reap a live room.
    pub fn touch(&mut self, now_ms: u64) {
        self.last_activity_ms = self.last_activity_ms.max(now_ms);
    }

    /// Total questions bound to this room (zero before start).
    pub fn questions_total(&self) -> usize {
        self.questions.len()
    }

    /// Add a player, enforcing the lifecycle and late-join policy.
    pub fn add_player(
        &mut self,
        nickname: String,
        allow_late_join: bool,
        now_ms: u64,
    ) -> Result<Player, ServiceError> {
        match self.machine.phase() {
            RoomPhase::Waiting => {}
            RoomPhase::InProgress(_) => {
                if !allow_late_join {
                    return Err(ServiceError::InvalidState(
                        "room is already in progress and late join is disabled".into(),
                    ));
                }
            }
            RoomPhase::Finished => {
                return Err(ServiceError::InvalidState("room is finished".into()));
            }
        }

        let nickname = nickname.trim().to_string();
        if nickname.is_empty() {
            return Err(ServiceError::InvalidInput("nickname must not be empty".into()));
        }

        let player = Player {
            id: Uuid::new_v4(),
            nickname,
        };
        self.players.insert(player.id, player.clone());
        self.touch(now_ms);
        Ok(player)
    }

    /// Bind the question sequence and open round 0.
    ///
    /// Questions are bound here rather than at room creation so content
    /// changes cannot leak into a room mid-game.
    pub fn start(
        &mut self,
        questions: Vec<Question>,
        now_ms: u64,
    ) -> Result<RoundView, ServiceError> {
        if !matches!(self.machine.phase(), RoomPhase::Waiting) {
            return Err(ServiceError::InvalidState("room has already started".into()));
        }
        if self.players.is_empty() {
            return Err(ServiceError::InvalidState(
                "cannot start a room without at least one player".into(),
            ));
        }
        if questions.is_empty() {
            return Err(ServiceError::InvalidState(
                "cannot start a room without questions".into(),
            ));
        }

        self.machine.apply(RoomEvent::Start)?;
        self.questions = questions;
        self.touch(now_ms);
        Ok(self.open_round(0, now_ms))
    }

    /// Advance to the next round, or finish the room when the sequence is
    /// exhausted.
    ///
    /// A round whose deadline has passed but whose timer has not fired yet
    /// is closed here first (first closer wins). A round that is still
    /// inside its window cannot be skipped.
    pub fn advance(&mut self, now_ms: u64) -> Result<AdvanceOutcome, ServiceError> {
        match self.machine.phase() {
            RoomPhase::Waiting => {
                return Err(ServiceError::InvalidState("room has not started yet".into()));
            }
            RoomPhase::Finished => {
                return Err(ServiceError::InvalidState("room is finished".into()));
            }
            RoomPhase::InProgress(_) => {}
        }

        let closed = self.close_due_round(now_ms);

        if matches!(
            self.machine.phase(),
            RoomPhase::InProgress(RoundStatus::Open)
        ) {
            return Err(ServiceError::InvalidState(
                "current round is still open".into(),
            ));
        }

        let next_index = self
            .current_round
            .as_ref()
            .map(|round| round.index + 1)
            .unwrap_or(0);

        self.touch(now_ms);
        if next_index < self.questions.len() {
            self.machine.apply(RoomEvent::OpenNext)?;
            let view = self.open_round(next_index, now_ms);
            Ok(AdvanceOutcome {
                closed,
                opened: Some(view),
            })
        } else {
            self.machine.apply(RoomEvent::Exhaust)?;
            Ok(AdvanceOutcome {
                closed,
                opened: None,
            })
        }
    }

    /// Validate and score a submission against the current round.
    pub fn submit(
        &mut self,
        player_id: Uuid,
        question_id: u64,
        choice: &str,
        now_ms: u64,
    ) -> Result<ScoreEntry, ServiceError> {
        match self.machine.phase() {
            RoomPhase::Waiting => {
                return Err(ServiceError::InvalidState("room has not started yet".into()));
            }
            RoomPhase::Finished => {
                return Err(ServiceError::InvalidState("room is finished".into()));
            }
            RoomPhase::InProgress(_) => {}
        }

        if !self.players.contains_key(&player_id) {
            return Err(ServiceError::NotFound(format!(
                "player `{player_id}` not found in this room"
            )));
        }

        let round = self
            .current_round
            .as_ref()
            .ok_or_else(|| ServiceError::InvalidState("no round has been opened".into()))?;

        if round.question_id != question_id {
            return Err(ServiceError::WrongRound);
        }

        // The window is half-open: a submission landing exactly on the
        // close timestamp is already late, even if the timer has not fired.
        if round.closed || now_ms >= round.closes_at_ms {
            return Err(ServiceError::RoundClosed);
        }

        let question = &self.questions[round.index];
        let correct = question.answer == choice;
        let latency_ms = now_ms.saturating_sub(round.opened_at_ms);
        let points = compute_points(correct, question.base_points, question.time_limit_secs, latency_ms);

        let entry = ScoreEntry {
            choice: choice.to_string(),
            correct,
            points,
            received_at_ms: now_ms,
        };
        let round_index = round.index;
        let recorded = self.ledger.record(player_id, round_index, entry)?.clone();
        self.touch(now_ms);
        Ok(recorded)
    }

    /// Close the current round if its deadline has elapsed.
    ///
    /// Idempotent: an already-closed round (or one still inside its
    /// window) yields `None` with no further effect.
    pub fn close_due_round(&mut self, now_ms: u64) -> Option<ClosedRound> {
        let due = self
            .current_round
            .as_ref()
            .is_some_and(|round| !round.closed && now_ms >= round.closes_at_ms);
        if !due {
            return None;
        }
        self.close_current_round()
    }

    /// Close the round with the given index regardless of the clock.
    ///
    /// Used by the deadline timer, which fires exactly when the window
    /// ends; the index guard makes a late firing against a newer round a
    /// no-op.
    pub fn force_close_round(&mut self, round_index: usize) -> Option<ClosedRound> {
        let matches_open = self
            .current_round
            .as_ref()
            .is_some_and(|round| !round.closed && round.index == round_index);
        if !matches_open {
            return None;
        }
        self.close_current_round()
    }

    /// The open round as pushed to clients, or `None` when no round is
    /// currently accepting submissions.
    pub fn current_round_view(&self, now_ms: u64) -> Option<RoundView> {
        let round = self.current_round.as_ref()?;
        if round.closed || now_ms >= round.closes_at_ms {
            return None;
        }
        Some(self.view_for(round))
    }

    /// Leaderboard snapshot: total score descending, ties resolved by join
    /// order. Iteration starts from the join-ordered player map, and the
    /// sort is stable, so the output never depends on hash ordering.
    pub fn leaderboard(&self) -> Vec<LeaderboardRow> {
        let mut rows: Vec<LeaderboardRow> = self
            .players
            .values()
            .map(|player| LeaderboardRow {
                player_id: player.id,
                nickname: player.nickname.clone(),
                total_score: self.ledger.total(player.id),
            })
            .collect();
        rows.sort_by(|a, b| b.total_score.cmp(&a.total_score));
        rows
    }

    /// Install the deadline timer handle for the open round, aborting any
    /// stale one.
    pub fn set_deadline_task(&mut self, handle: JoinHandle<()>) {
        if let Some(previous) = self.deadline_task.replace(handle) {
            previous.abort();
        }
    }

    /// Abort the pending deadline timer, if any. Called on eviction.
    pub fn abort_deadline_task(&mut self) {
        if let Some(task) = self.deadline_task.take() {
            task.abort();
        }
    }

    fn open_round(&mut self, index: usize, now_ms: u64) -> RoundView {
        let question = &self.questions[index];
        let round = Round {
            index,
            question_id: question.id,
            opened_at_ms: now_ms,
            closes_at_ms: now_ms + u64::from(question.time_limit_secs) * 1000,
            closed: false,
        };
        let view = self.view_for(&round);
        self.current_round = Some(round);
        view
    }

    fn close_current_round(&mut self) -> Option<ClosedRound> {
        self.machine.apply(RoomEvent::CloseRound).ok()?;
        let round = self.current_round.as_mut()?;
        round.closed = true;
        Some(ClosedRound {
            index: round.index,
            question: self.questions[round.index].clone(),
            closed_at_ms: round.closes_at_ms,
        })
    }

    fn view_for(&self, round: &Round) -> RoundView {
        RoundView {
            index: round.index,
            total: self.questions.len(),
            question: self.questions[round.index].clone(),
            opened_at_ms: round.opened_at_ms,
            closes_at_ms: round.closes_at_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: u64 = 1_000_000;

    fn question(id: u64, answer: &str) -> Question {
        Question {
            id,
            stem: format!("question {id}"),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            answer: answer.into(),
            time_limit_secs: 15,
            base_points: 1000,
            category: None,
            explanation: None,
        }
    }

    fn started_session(question_count: usize, players: &[&str]) -> (RoomSession, Vec<Uuid>) {
        let mut session = RoomSession::new(T0);
        let ids: Vec<Uuid> = players
            .iter()
            .map(|nickname| {
                session
                    .add_player((*nickname).into(), true, T0)
                    .unwrap()
                    .id
            })
            .collect();
        let questions = (0..question_count as u64)
            .map(|id| question(id + 1, "A"))
            .collect();
        session.start(questions, T0).unwrap();
        (session, ids)
    }

    #[test]
    fn start_requires_a_player() {
        let mut session = RoomSession::new(T0);
        let err = session.start(vec![question(1, "A")], T0).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[test]
    fn start_requires_questions() {
        let mut session = RoomSession::new(T0);
        session.add_player("alice".into(), true, T0).unwrap();
        let err = session.start(Vec::new(), T0).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[test]
    fn start_opens_round_zero_with_deadline() {
        let (session, _) = started_session(2, &["alice"]);
        let view = session.current_round_view(T0).unwrap();
        assert_eq!(view.index, 0);
        assert_eq!(view.total, 2);
        assert_eq!(view.opened_at_ms, T0);
        assert_eq!(view.closes_at_ms, T0 + 15_000);
    }

    #[test]
    fn second_start_is_rejected() {
        let (mut session, _) = started_session(1, &["alice"]);
        let err = session.start(vec![question(9, "A")], T0).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[test]
    fn empty_nickname_is_rejected() {
        let mut session = RoomSession::new(T0);
        let err = session.add_player("   ".into(), true, T0).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[test]
    fn late_join_follows_the_policy() {
        let (mut session, _) = started_session(1, &["alice"]);

        let err = session.add_player("late".into(), false, T0 + 1).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        let player = session.add_player("late".into(), true, T0 + 1).unwrap();
        assert_eq!(session.player_count(), 2);
        // Late joiners start from zero.
        let rows = session.leaderboard();
        assert!(rows.iter().any(|row| row.player_id == player.id && row.total_score == 0));
    }

    #[test]
    fn join_after_finish_is_rejected() {
        let (mut session, _) = started_session(1, &["alice"]);
        session.close_due_round(T0 + 15_000).unwrap();
        session.advance(T0 + 15_001).unwrap();
        assert_eq!(session.phase(), RoomPhase::Finished);

        let err = session.add_player("late".into(), true, T0 + 16_000).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[test]
    fn correct_submission_is_speed_weighted() {
        let (mut session, ids) = started_session(1, &["alice"]);
        let entry = session.submit(ids[0], 1, "A", T0 + 3_000).unwrap();
        assert!(entry.correct);
        assert_eq!(entry.points, 800); // 1000 * (1 - 3000/15000)
    }

    #[test]
    fn wrong_answer_scores_zero() {
        let (mut session, ids) = started_session(1, &["alice"]);
        let entry = session.submit(ids[0], 1, "B", T0 + 1_000).unwrap();
        assert!(!entry.correct);
        assert_eq!(entry.points, 0);
    }

    #[test]
    fn duplicate_submission_is_rejected() {
        let (mut session, ids) = started_session(1, &["alice"]);
        session.submit(ids[0], 1, "A", T0 + 1_000).unwrap();
        let err = session.submit(ids[0], 1, "B", T0 + 2_000).unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyAnswered));
        // The accepted entry is untouched.
        assert_eq!(session.leaderboard()[0].total_score, compute_points(true, 1000, 15, 1_000));
    }

    #[test]
    fn mismatched_question_is_wrong_round() {
        let (mut session, ids) = started_session(2, &["alice"]);
        let err = session.submit(ids[0], 2, "A", T0 + 1_000).unwrap_err();
        assert!(matches!(err, ServiceError::WrongRound));
    }

    #[test]
    fn submission_at_or_after_close_is_rejected() {
        let (mut session, ids) = started_session(1, &["alice"]);

        // Exactly on the close timestamp: already late, even though no
        // timer or host action has observed the deadline yet.
        let err = session.submit(ids[0], 1, "A", T0 + 15_000).unwrap_err();
        assert!(matches!(err, ServiceError::RoundClosed));

        let err = session.submit(ids[0], 1, "A", T0 + 20_000).unwrap_err();
        assert!(matches!(err, ServiceError::RoundClosed));
    }

    #[test]
    fn unknown_player_is_not_found() {
        let (mut session, _) = started_session(1, &["alice"]);
        let err = session.submit(Uuid::new_v4(), 1, "A", T0 + 1_000).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn submit_before_start_is_invalid_state() {
        let mut session = RoomSession::new(T0);
        let alice = session.add_player("alice".into(), true, T0).unwrap();
        let err = session.submit(alice.id, 1, "A", T0).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[test]
    fn close_is_idempotent_across_actors() {
        let (mut session, _) = started_session(1, &["alice"]);

        // Timer fires first.
        let closed = session.force_close_round(0).unwrap();
        assert_eq!(closed.index, 0);

        // A raced second close (lazy observer) sees nothing left to do.
        assert!(session.close_due_round(T0 + 15_000).is_none());
        assert!(session.force_close_round(0).is_none());
    }

    #[test]
    fn timer_firing_against_a_newer_round_is_a_noop() {
        let (mut session, _) = started_session(2, &["alice"]);
        session.close_due_round(T0 + 15_000).unwrap();
        session.advance(T0 + 15_000).unwrap();

        // A stale timer for round 0 must not touch round 1.
        assert!(session.force_close_round(0).is_none());
        assert!(session.current_round_view(T0 + 15_001).is_some());
    }

    #[test]
    fn advance_while_round_open_is_rejected() {
        let (mut session, _) = started_session(2, &["alice"]);
        let err = session.advance(T0 + 5_000).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        // Round 0 is untouched.
        assert_eq!(session.current_round_view(T0 + 5_000).unwrap().index, 0);
    }

    #[test]
    fn advance_after_deadline_closes_lazily_and_opens_next() {
        let (mut session, _) = started_session(2, &["alice"]);

        let outcome = session.advance(T0 + 15_000).unwrap();
        let closed = outcome.closed.expect("deadline close happens lazily");
        assert_eq!(closed.index, 0);
        let opened = outcome.opened.expect("second question exists");
        assert_eq!(opened.index, 1);
        assert_eq!(opened.opened_at_ms, T0 + 15_000);
    }

    #[test]
    fn round_indices_advance_by_exactly_one() {
        let (mut session, _) = started_session(3, &["alice"]);
        let mut now = T0;
        for expected in 1..3 {
            now += 15_000;
            let outcome = session.advance(now).unwrap();
            assert_eq!(outcome.opened.unwrap().index, expected);
        }
    }

    #[test]
    fn exhausting_the_sequence_finishes_the_room() {
        let (mut session, ids) = started_session(1, &["alice"]);

        let outcome = session.advance(T0 + 15_000).unwrap();
        assert!(outcome.opened.is_none());
        assert_eq!(session.phase(), RoomPhase::Finished);

        let err = session.advance(T0 + 16_000).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        let err = session.submit(ids[0], 1, "A", T0 + 16_000).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[test]
    fn double_advance_in_immediate_succession_cannot_skip_a_round() {
        let (mut session, _) = started_session(3, &["alice"]);

        let outcome = session.advance(T0 + 15_000).unwrap();
        assert_eq!(outcome.opened.unwrap().index, 1);

        // The second call faces the freshly opened round 1 and is rejected.
        let err = session.advance(T0 + 15_000).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert_eq!(session.current_round_view(T0 + 15_001).unwrap().index, 1);
    }

    #[test]
    fn current_round_view_is_none_outside_the_window() {
        let (session, _) = started_session(1, &["alice"]);
        assert!(session.current_round_view(T0 + 1).is_some());
        // Deadline passed but nothing has observed it yet: still no open round.
        assert!(session.current_round_view(T0 + 15_000).is_none());
    }

    #[test]
    fn leaderboard_orders_by_score_then_join_order() {
        let (mut session, ids) = started_session(2, &["alice", "bob", "carol"]);

        // Alice answers correctly within 2s, Bob wrong, Carol silent.
        session.submit(ids[0], 1, "A", T0 + 2_000).unwrap();
        session.submit(ids[1], 1, "B", T0 + 4_000).unwrap();
        session.close_due_round(T0 + 15_000).unwrap();

        let rows = session.leaderboard();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].player_id, ids[0]);
        assert!(rows[0].total_score > 0);
        // Tie at zero resolves by join order: bob before carol, always.
        assert_eq!(rows[1].player_id, ids[1]);
        assert_eq!(rows[2].player_id, ids[2]);
        assert_eq!(rows[1].total_score, 0);
        assert_eq!(rows[2].total_score, 0);
    }

    #[test]
    fn leaderboard_is_stable_across_recomputation() {
        let (mut session, ids) = started_session(1, &["p1", "p2", "p3", "p4"]);
        session.submit(ids[2], 1, "A", T0 + 1_000).unwrap();

        let first = session.leaderboard();
        for _ in 0..10 {
            assert_eq!(session.leaderboard(), first);
        }
        assert_eq!(first[0].player_id, ids[2]);
    }

    #[test]
    fn scores_accumulate_across_rounds() {
        let (mut session, ids) = started_session(2, &["alice"]);
        session.submit(ids[0], 1, "A", T0).unwrap();
        let outcome = session.advance(T0 + 15_000).unwrap();
        let opened = outcome.opened.unwrap();
        session
            .submit(ids[0], opened.question.id, "A", opened.opened_at_ms)
            .unwrap();

        assert_eq!(session.leaderboard()[0].total_score, 2000);
    }
}
