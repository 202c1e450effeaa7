use serde::Serialize;
use utoipa::ToSchema;

use crate::state::state_machine::{RoomPhase, RoundStatus};

/// Publicly visible room phase exposed to clients (REST/SSE).
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleRoomPhase {
    /// Players are gathering; the game has not started.
    Waiting,
    /// A question is open for submissions.
    RoundOpen,
    /// The current question closed; waiting for the host to advance.
    RoundClosed,
    /// The question sequence is exhausted.
    Finished,
}

impl From<RoomPhase> for VisibleRoomPhase {
    fn from(value: RoomPhase) -> Self {
        match value {
            RoomPhase::Waiting => VisibleRoomPhase::Waiting,
            RoomPhase::InProgress(RoundStatus::Open) => VisibleRoomPhase::RoundOpen,
            RoomPhase::InProgress(RoundStatus::Closed) => VisibleRoomPhase::RoundClosed,
            RoomPhase::Finished => VisibleRoomPhase::Finished,
        }
    }
}
