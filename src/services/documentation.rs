use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the quiz arena backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::rooms::create_room,
        crate::routes::rooms::join_room,
        crate::routes::rooms::start_room,
        crate::routes::rooms::next_question,
        crate::routes::rooms::current_round,
        crate::routes::rooms::submit_answer,
        crate::routes::rooms::room_summary,
        crate::routes::sse::room_events,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::room::CreateRoomResponse,
            crate::dto::room::JoinRoomRequest,
            crate::dto::room::JoinRoomResponse,
            crate::dto::room::RoomSummary,
            crate::dto::room::PlayerSummary,
            crate::dto::round::QuestionPush,
            crate::dto::answer::SubmitAnswerRequest,
            crate::dto::answer::SubmitAnswerResponse,
            crate::dto::leaderboard::LeaderboardEntry,
            crate::dto::leaderboard::LeaderboardPush,
            crate::dto::sse::PlayerJoinedEvent,
            crate::dto::sse::RoundClosedEvent,
            crate::dto::sse::RoomFinishedEvent,
            crate::dto::phase::VisibleRoomPhase,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rooms", description = "Room lifecycle, submissions, and resync"),
        (name = "sse", description = "Per-room server-sent event streams"),
    )
)]
pub struct ApiDoc;
