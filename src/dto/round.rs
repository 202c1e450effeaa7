use serde::Serialize;
use utoipa::ToSchema;

use crate::state::room::RoundView;

/// Question payload pushed when a round opens, and served to late joiners
/// via the resync query. Timestamps are server epoch milliseconds; clients
/// must treat `closedAtEpochMs` as authoritative for disabling input.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPush {
    /// Identifier of the question being asked.
    pub question_id: u64,
    /// The question text.
    pub stem: String,
    /// Answer options in display order.
    pub options: Vec<String>,
    /// Server time at which the round opened.
    pub opened_at_epoch_ms: u64,
    /// Server time at which the round closes.
    pub closed_at_epoch_ms: u64,
    /// One-based position of this question in the room's sequence.
    pub current_index: u32,
    /// Total questions in the room's sequence.
    pub total_count: u32,
}

impl From<RoundView> for QuestionPush {
    fn from(view: RoundView) -> Self {
        Self {
            question_id: view.question.id,
            stem: view.question.stem,
            options: view.question.options,
            opened_at_epoch_ms: view.opened_at_ms,
            closed_at_epoch_ms: view.closes_at_ms,
            current_index: view.index as u32 + 1,
            total_count: view.total as u32,
        }
    }
}
