use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        leaderboard::LeaderboardPush,
        round::QuestionPush,
        sse::{PlayerJoinedEvent, RoomFinishedEvent, RoundClosedEvent, ServerEvent},
    },
    state::{
        RoomHandle,
        room::{ClosedRound, LeaderboardRow, Player},
    },
};

const EVENT_QUESTION_OPENED: &str = "question.opened";
const EVENT_ROUND_CLOSED: &str = "round.closed";
const EVENT_LEADERBOARD_UPDATED: &str = "leaderboard.updated";
const EVENT_PLAYER_JOINED: &str = "player.joined";
const EVENT_ROOM_FINISHED: &str = "room.finished";

/// Broadcast a freshly opened round to all room subscribers.
pub fn broadcast_question_opened(room: &RoomHandle, push: &QuestionPush) {
    send_room_event(room, EVENT_QUESTION_OPENED, push);
}

/// Broadcast a round close, revealing the correct answer.
pub fn broadcast_round_closed(room: &RoomHandle, closed: &ClosedRound) {
    let payload = RoundClosedEvent {
        question_id: closed.question.id,
        correct_answer: closed.question.answer.clone(),
        explanation: closed.question.explanation.clone(),
        closed_at_epoch_ms: closed.closed_at_ms,
    };
    send_room_event(room, EVENT_ROUND_CLOSED, &payload);
}

/// Broadcast a ranked leaderboard snapshot.
pub fn broadcast_leaderboard(room: &RoomHandle, rows: Vec<LeaderboardRow>, now_ms: u64) {
    let payload = LeaderboardPush::new(rows, now_ms);
    send_room_event(room, EVENT_LEADERBOARD_UPDATED, &payload);
}

/// Broadcast that a player joined the room.
pub fn broadcast_player_joined(room: &RoomHandle, player: &Player, player_count: usize) {
    let payload = PlayerJoinedEvent {
        player_id: player.id,
        nickname: player.nickname.clone(),
        player_count: player_count as u32,
    };
    send_room_event(room, EVENT_PLAYER_JOINED, &payload);
}

/// Broadcast that the room exhausted its question sequence.
pub fn broadcast_room_finished(room: &RoomHandle, total_rounds: usize, now_ms: u64) {
    let payload = RoomFinishedEvent {
        total_rounds: total_rounds as u32,
        server_time_epoch_ms: now_ms,
    };
    send_room_event(room, EVENT_ROOM_FINISHED, &payload);
}

fn send_room_event(room: &RoomHandle, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => room.hub.broadcast(event),
        Err(err) => warn!(
            room = %room.code,
            event,
            error = %err,
            "failed to serialize room SSE payload"
        ),
    }
}
