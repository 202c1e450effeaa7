use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::{
        answer::{SubmitAnswerRequest, SubmitAnswerResponse},
        room::{CreateRoomResponse, JoinRoomRequest, JoinRoomResponse, RoomSummary},
        round::QuestionPush,
    },
    error::AppError,
    services::room_service,
    state::SharedState,
};

const HOST_TOKEN_HEADER: &str = "x-host-token";

/// Routes handling the room lifecycle, submissions, and resync.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/{code}", get(room_summary))
        .route("/rooms/{code}/join", post(join_room))
        .route("/rooms/{code}/start", post(start_room))
        .route("/rooms/{code}/next", post(next_question))
        .route("/rooms/{code}/current", get(current_round))
        .route("/rooms/{code}/answer", post(submit_answer))
}

/// Create a fresh room and return its code and host capability token.
#[utoipa::path(
    post,
    path = "/rooms",
    tag = "rooms",
    responses(
        (status = 200, description = "Room created", body = CreateRoomResponse)
    )
)]
pub async fn create_room(State(state): State<SharedState>) -> Json<CreateRoomResponse> {
    Json(room_service::create_room(&state))
}

/// Join a live room with a nickname.
#[utoipa::path(
    post,
    path = "/rooms/{code}/join",
    tag = "rooms",
    params(("code" = String, Path, description = "Room code")),
    request_body = JoinRoomRequest,
    responses(
        (status = 200, description = "Joined", body = JoinRoomResponse),
        (status = 400, description = "Invalid nickname"),
        (status = 404, description = "Unknown room code"),
        (status = 409, description = "Room not accepting players")
    )
)]
pub async fn join_room(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<JoinRoomRequest>,
) -> Result<Json<JoinRoomResponse>, AppError> {
    payload.validate()?;
    let joined = room_service::join_room(&state, &code, payload).await?;
    Ok(Json(joined))
}

/// Start the room and open its first question.
#[utoipa::path(
    post,
    path = "/rooms/{code}/start",
    tag = "rooms",
    params(
        ("code" = String, Path, description = "Room code"),
        ("X-Host-Token" = String, Header, description = "Host capability token")
    ),
    responses(
        (status = 200, description = "First question opened", body = QuestionPush),
        (status = 401, description = "Missing or invalid host token"),
        (status = 409, description = "Room cannot start")
    )
)]
pub async fn start_room(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    headers: HeaderMap,
) -> Result<Json<QuestionPush>, AppError> {
    let token = host_token(&headers)?;
    let push = room_service::start_room(&state, &code, token).await?;
    Ok(Json(push))
}

/// Advance to the next question; 204 once the sequence is exhausted.
#[utoipa::path(
    post,
    path = "/rooms/{code}/next",
    tag = "rooms",
    params(
        ("code" = String, Path, description = "Room code"),
        ("X-Host-Token" = String, Header, description = "Host capability token")
    ),
    responses(
        (status = 200, description = "Next question opened", body = QuestionPush),
        (status = 204, description = "Sequence exhausted; room finished"),
        (status = 401, description = "Missing or invalid host token"),
        (status = 409, description = "Current round is still open")
    )
)]
pub async fn next_question(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let token = host_token(&headers)?;
    match room_service::next_question(&state, &code, token).await? {
        Some(push) => Ok(Json(push).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// Current question for late joiners / page refresh; 204 when no round is open.
#[utoipa::path(
    get,
    path = "/rooms/{code}/current",
    tag = "rooms",
    params(("code" = String, Path, description = "Room code")),
    responses(
        (status = 200, description = "Open round", body = QuestionPush),
        (status = 204, description = "No round open"),
        (status = 404, description = "Unknown room code")
    )
)]
pub async fn current_round(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Response, AppError> {
    match room_service::current_round(&state, &code).await? {
        Some(push) => Ok(Json(push).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// Submit an answer for the open round.
#[utoipa::path(
    post,
    path = "/rooms/{code}/answer",
    tag = "rooms",
    params(("code" = String, Path, description = "Room code")),
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, description = "Answer accepted", body = SubmitAnswerResponse),
        (status = 400, description = "Malformed choice"),
        (status = 404, description = "Unknown room or player"),
        (status = 409, description = "Rejected: wrong_round, round_closed, or already_answered")
    )
)]
pub async fn submit_answer(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    payload.validate()?;
    let response = room_service::submit_answer(&state, &code, payload).await?;
    Ok(Json(response))
}

/// Public snapshot of a room's state.
#[utoipa::path(
    get,
    path = "/rooms/{code}",
    tag = "rooms",
    params(("code" = String, Path, description = "Room code")),
    responses(
        (status = 200, description = "Room state", body = RoomSummary),
        (status = 404, description = "Unknown room code")
    )
)]
pub async fn room_summary(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<RoomSummary>, AppError> {
    let summary = room_service::room_summary(&state, &code).await?;
    Ok(Json(summary))
}

/// Pull the host token header, rejecting requests that lack it.
fn host_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(HOST_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing X-Host-Token header".into()))
}
