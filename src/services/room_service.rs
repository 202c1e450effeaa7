//! Business logic powering the room REST routes. Every operation resolves
//! the room through the registry, takes the room's lock, applies the
//! session transition, and broadcasts the resulting events while still
//! holding the lock so subscribers observe them in order.

use tracing::{debug, info};

use crate::{
    clock,
    dto::{
        answer::{SubmitAnswerRequest, SubmitAnswerResponse},
        room::{CreateRoomResponse, JoinRoomRequest, JoinRoomResponse, PlayerSummary, RoomSummary},
        round::QuestionPush,
    },
    error::ServiceError,
    services::{round_timer, sse_events},
    state::{RoomHandle, SharedState, room::RoomSession},
};

/// Allocate a fresh room and hand its capability token to the creator.
pub fn create_room(state: &SharedState) -> CreateRoomResponse {
    let room = state.rooms().create_room(clock::now_epoch_ms());
    info!(room = %room.code, "room created");
    CreateRoomResponse {
        room_code: room.code.clone(),
        host_token: room.host_token().to_string(),
    }
}

/// Join a live room under the configured late-join policy.
pub async fn join_room(
    state: &SharedState,
    code: &str,
    request: JoinRoomRequest,
) -> Result<JoinRoomResponse, ServiceError> {
    let room = state.room(code)?;
    let now = clock::now_epoch_ms();

    let mut session = room.session.lock().await;
    finalize_due_round(&room, &mut session, now);
    let player = session.add_player(request.nickname, state.config().allow_late_join, now)?;
    sse_events::broadcast_player_joined(&room, &player, session.player_count());
    info!(room = %room.code, player = %player.id, "player joined");

    Ok(JoinRoomResponse {
        player_id: player.id,
        nickname: player.nickname,
    })
}

/// Start the room: bind a freshly drawn question sequence and open round 0.
pub async fn start_room(
    state: &SharedState,
    code: &str,
    host_token: &str,
) -> Result<QuestionPush, ServiceError> {
    let room = state.room(code)?;
    room.verify_host_token(host_token)?;
    let now = clock::now_epoch_ms();

    let mut session = room.session.lock().await;
    let questions = state
        .bank()
        .draw_sequence(state.config().questions_per_room);
    let view = session.start(questions, now)?;

    let push: QuestionPush = view.clone().into();
    sse_events::broadcast_question_opened(&room, &push);
    // Initial snapshot so clients reset their boards for the new game.
    sse_events::broadcast_leaderboard(&room, session.leaderboard(), now);

    let timer = round_timer::schedule_round_deadline(room.clone(), view.index, view.closes_at_ms);
    session.set_deadline_task(timer);

    info!(
        room = %room.code,
        questions = session.questions_total(),
        players = session.player_count(),
        "room started"
    );
    Ok(push)
}

/// Advance to the next round; `None` means the sequence is exhausted and
/// the room finished.
pub async fn next_question(
    state: &SharedState,
    code: &str,
    host_token: &str,
) -> Result<Option<QuestionPush>, ServiceError> {
    let room = state.room(code)?;
    room.verify_host_token(host_token)?;
    let now = clock::now_epoch_ms();

    let mut session = room.session.lock().await;
    let outcome = session.advance(now)?;

    if let Some(closed) = &outcome.closed {
        sse_events::broadcast_round_closed(&room, closed);
        sse_events::broadcast_leaderboard(&room, session.leaderboard(), now);
    }

    match outcome.opened {
        Some(view) => {
            let push: QuestionPush = view.clone().into();
            sse_events::broadcast_question_opened(&room, &push);
            let timer =
                round_timer::schedule_round_deadline(room.clone(), view.index, view.closes_at_ms);
            session.set_deadline_task(timer);
            Ok(Some(push))
        }
        None => {
            session.abort_deadline_task();
            sse_events::broadcast_room_finished(&room, session.questions_total(), now);
            info!(room = %room.code, "room finished");
            Ok(None)
        }
    }
}

/// Current question payload for late joiners and reconnecting clients;
/// `None` when no round is open.
pub async fn current_round(
    state: &SharedState,
    code: &str,
) -> Result<Option<QuestionPush>, ServiceError> {
    let room = state.room(code)?;
    let now = clock::now_epoch_ms();

    let mut session = room.session.lock().await;
    finalize_due_round(&room, &mut session, now);
    Ok(session.current_round_view(now).map(Into::into))
}

/// Validate and score a submission against the room's open round.
pub async fn submit_answer(
    state: &SharedState,
    code: &str,
    request: SubmitAnswerRequest,
) -> Result<SubmitAnswerResponse, ServiceError> {
    let room = state.room(code)?;
    let now = clock::now_epoch_ms();

    let mut session = room.session.lock().await;
    finalize_due_round(&room, &mut session, now);
    let entry = session.submit(request.player_id, request.question_id, &request.choice, now)?;
    debug!(
        room = %room.code,
        player = %request.player_id,
        question = request.question_id,
        correct = entry.correct,
        points = entry.points,
        client_timestamp_ms = ?request.client_timestamp_ms,
        "answer accepted"
    );

    Ok(SubmitAnswerResponse::accepted())
}

/// Public snapshot of a room's state.
pub async fn room_summary(state: &SharedState, code: &str) -> Result<RoomSummary, ServiceError> {
    let room = state.room(code)?;
    let now = clock::now_epoch_ms();

    let mut session = room.session.lock().await;
    finalize_due_round(&room, &mut session, now);
    let players: Vec<PlayerSummary> = session.players().map(PlayerSummary::from).collect();
    Ok(RoomSummary::new(
        room.code.clone(),
        session.phase().into(),
        players,
        session.questions_total(),
        room.created_at_ms,
    ))
}

/// Close the current round if its deadline already passed, broadcasting the
/// reveal and leaderboard. Lazy counterpart to the deadline timer; whoever
/// observes the elapsed deadline first performs the close, the other sees a
/// no-op.
fn finalize_due_round(room: &RoomHandle, session: &mut RoomSession, now_ms: u64) {
    if let Some(closed) = session.close_due_round(now_ms) {
        debug!(room = %room.code, round = closed.index, "closing round past its deadline");
        sse_events::broadcast_round_closed(room, &closed);
        sse_events::broadcast_leaderboard(room, session.leaderboard(), now_ms);
    }
}
