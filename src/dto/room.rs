use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{format_epoch_ms, phase::VisibleRoomPhase, validation::validate_nickname},
    state::room::Player,
};

/// Payload returned when a room is created. The host token is the room's
/// capability secret and is never exposed again after this response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    /// Shareable code players use to join.
    pub room_code: String,
    /// Capability secret authorizing start/next on this room.
    pub host_token: String,
}

/// Payload used to join an existing room.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    /// Display name; not required to be unique within the room.
    #[validate(custom(function = validate_nickname))]
    pub nickname: String,
}

/// Payload returned once a player has joined.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomResponse {
    /// Server-issued identifier, unique within the room.
    pub player_id: Uuid,
    /// The nickname as stored (trimmed).
    pub nickname: String,
}

/// Public projection of a joined player.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    /// Server-issued player identifier.
    pub player_id: Uuid,
    /// Display name.
    pub nickname: String,
}

impl From<&Player> for PlayerSummary {
    fn from(player: &Player) -> Self {
        Self {
            player_id: player.id,
            nickname: player.nickname.clone(),
        }
    }
}

/// Snapshot of a room's public state.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    /// The room's shareable code.
    pub room_code: String,
    /// Current lifecycle phase.
    pub phase: VisibleRoomPhase,
    /// Players in join order.
    pub players: Vec<PlayerSummary>,
    /// Number of questions bound to the room; zero before start.
    pub total_count: u32,
    /// Creation timestamp, RFC 3339.
    pub created_at: String,
}

impl RoomSummary {
    /// Assemble a summary from room parts gathered under the room lock.
    pub fn new(
        room_code: String,
        phase: VisibleRoomPhase,
        players: Vec<PlayerSummary>,
        total_count: usize,
        created_at_ms: u64,
    ) -> Self {
        Self {
            room_code,
            phase,
            players,
            total_count: total_count as u32,
            created_at: format_epoch_ms(created_at_ms),
        }
    }
}
