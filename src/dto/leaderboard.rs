use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::room::LeaderboardRow;

/// One ranked row of the leaderboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// Player the entry belongs to.
    pub player_id: Uuid,
    /// Display name at join time.
    pub nickname: String,
    /// Cumulative score across all rounds.
    pub total_score: u32,
}

impl From<LeaderboardRow> for LeaderboardEntry {
    fn from(row: LeaderboardRow) -> Self {
        Self {
            player_id: row.player_id,
            nickname: row.nickname,
            total_score: row.total_score,
        }
    }
}

/// Leaderboard snapshot pushed to all room subscribers. Entries arrive
/// pre-sorted (score descending, ties by join order); clients must not
/// re-sort them.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardPush {
    /// Ranked entries, one per player.
    pub entries: Vec<LeaderboardEntry>,
    /// Server time at which the snapshot was computed.
    pub server_time_epoch_ms: u64,
}

impl LeaderboardPush {
    /// Wrap ranked rows into a push payload stamped with server time.
    pub fn new(rows: Vec<LeaderboardRow>, server_time_epoch_ms: u64) -> Self {
        Self {
            entries: rows.into_iter().map(Into::into).collect(),
            server_time_epoch_ms,
        }
    }
}
