use thiserror::Error;

/// High-level phases a room can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomPhase {
    /// Players are gathering; no questions bound yet.
    Waiting,
    /// A game is running; the sub-state tracks the current round window.
    InProgress(RoundStatus),
    /// The question sequence is exhausted; terminal.
    Finished,
}

/// Fine-grained status of the current round while the room is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStatus {
    /// Submissions are being accepted until the deadline.
    Open,
    /// The deadline passed; waiting for the host to advance.
    Closed,
}

/// Events that can be applied to the room state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomEvent {
    /// Host starts the game, binding questions and opening round 0.
    Start,
    /// The current round's deadline elapsed.
    CloseRound,
    /// Host advances to the next question after a close.
    OpenNext,
    /// Host advances past the last question.
    Exhaust,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event was received.
    pub from: RoomPhase,
    /// The event that cannot be applied from this phase.
    pub event: RoomEvent,
}

/// State machine implementing the room lifecycle.
///
/// The machine only validates phase changes; the surrounding session owns
/// round indices, deadlines, and scores.
#[derive(Debug, Clone)]
pub struct RoomStateMachine {
    phase: RoomPhase,
}

impl Default for RoomStateMachine {
    fn default() -> Self {
        Self {
            phase: RoomPhase::Waiting,
        }
    }
}

impl RoomStateMachine {
    /// Create a new state machine initialised in the waiting state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> RoomPhase {
        self.phase
    }

    /// Apply an event, moving the state machine to the next phase.
    pub fn apply(&mut self, event: RoomEvent) -> Result<RoomPhase, InvalidTransition> {
        self.phase = self.compute_transition(event)?;
        Ok(self.phase)
    }

    /// Compute a transition from an event if the transition is valid.
    fn compute_transition(&self, event: RoomEvent) -> Result<RoomPhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (RoomPhase::Waiting, RoomEvent::Start) => RoomPhase::InProgress(RoundStatus::Open),
            (RoomPhase::InProgress(RoundStatus::Open), RoomEvent::CloseRound) => {
                RoomPhase::InProgress(RoundStatus::Closed)
            }
            (RoomPhase::InProgress(RoundStatus::Closed), RoomEvent::OpenNext) => {
                RoomPhase::InProgress(RoundStatus::Open)
            }
            (RoomPhase::InProgress(RoundStatus::Closed), RoomEvent::Exhaust) => RoomPhase::Finished,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(sm: &mut RoomStateMachine, event: RoomEvent) -> RoomPhase {
        sm.apply(event).unwrap()
    }

    #[test]
    fn initial_state_is_waiting() {
        let sm = RoomStateMachine::new();
        assert_eq!(sm.phase(), RoomPhase::Waiting);
    }

    #[test]
    fn full_happy_path_through_two_rounds() {
        let mut sm = RoomStateMachine::new();

        assert_eq!(
            apply(&mut sm, RoomEvent::Start),
            RoomPhase::InProgress(RoundStatus::Open)
        );
        assert_eq!(
            apply(&mut sm, RoomEvent::CloseRound),
            RoomPhase::InProgress(RoundStatus::Closed)
        );
        assert_eq!(
            apply(&mut sm, RoomEvent::OpenNext),
            RoomPhase::InProgress(RoundStatus::Open)
        );
        assert_eq!(
            apply(&mut sm, RoomEvent::CloseRound),
            RoomPhase::InProgress(RoundStatus::Closed)
        );
        assert_eq!(apply(&mut sm, RoomEvent::Exhaust), RoomPhase::Finished);
    }

    #[test]
    fn cannot_start_twice() {
        let mut sm = RoomStateMachine::new();
        apply(&mut sm, RoomEvent::Start);

        let err = sm.apply(RoomEvent::Start).unwrap_err();
        assert_eq!(err.from, RoomPhase::InProgress(RoundStatus::Open));
        assert_eq!(err.event, RoomEvent::Start);
    }

    #[test]
    fn cannot_advance_while_round_is_open() {
        let mut sm = RoomStateMachine::new();
        apply(&mut sm, RoomEvent::Start);

        let err = sm.apply(RoomEvent::OpenNext).unwrap_err();
        assert_eq!(err.from, RoomPhase::InProgress(RoundStatus::Open));
    }

    #[test]
    fn cannot_close_an_already_closed_round() {
        let mut sm = RoomStateMachine::new();
        apply(&mut sm, RoomEvent::Start);
        apply(&mut sm, RoomEvent::CloseRound);

        // Idempotent close is the session's job; the raw machine stays strict.
        assert!(sm.apply(RoomEvent::CloseRound).is_err());
    }

    #[test]
    fn finished_is_terminal() {
        let mut sm = RoomStateMachine::new();
        apply(&mut sm, RoomEvent::Start);
        apply(&mut sm, RoomEvent::CloseRound);
        apply(&mut sm, RoomEvent::Exhaust);

        for event in [
            RoomEvent::Start,
            RoomEvent::CloseRound,
            RoomEvent::OpenNext,
            RoomEvent::Exhaust,
        ] {
            let err = sm.apply(event).unwrap_err();
            assert_eq!(err.from, RoomPhase::Finished);
        }
    }

    #[test]
    fn waiting_rejects_round_events() {
        let mut sm = RoomStateMachine::new();
        assert!(sm.apply(RoomEvent::CloseRound).is_err());
        assert!(sm.apply(RoomEvent::OpenNext).is_err());
        assert!(sm.apply(RoomEvent::Exhaust).is_err());
    }
}
