use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug)]
/// Dispatched payload carried across a room's SSE channel.
pub struct ServerEvent {
    /// Optional SSE event name.
    pub event: Option<String>,
    /// Serialized JSON payload.
    pub data: String,
}

impl ServerEvent {
    /// Build an event with a raw data string.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a player joins the room.
pub struct PlayerJoinedEvent {
    /// The new player's identifier.
    pub player_id: Uuid,
    /// The new player's nickname.
    pub nickname: String,
    /// Room population after the join.
    pub player_count: u32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a round closes, revealing the answer.
pub struct RoundClosedEvent {
    /// Question the reveal is for.
    pub question_id: u64,
    /// The recorded correct answer.
    pub correct_answer: String,
    /// Optional explanation authored with the question.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Server time at which the round closed.
    pub closed_at_epoch_ms: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast once when the question sequence is exhausted.
pub struct RoomFinishedEvent {
    /// Number of rounds that were played.
    pub total_rounds: u32,
    /// Server time of the transition.
    pub server_time_epoch_ms: u64,
}
