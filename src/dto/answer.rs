use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dto::validation::validate_choice;

/// Payload submitted by a player answering the open round.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    /// Identifier issued at join time.
    pub player_id: Uuid,
    /// Question the answer is for; must match the open round.
    pub question_id: u64,
    /// The chosen option, compared verbatim.
    #[validate(custom(function = validate_choice))]
    pub choice: String,
    /// Client-side timestamp, informational only; the server clock governs
    /// the submission window.
    #[serde(default)]
    pub client_timestamp_ms: Option<u64>,
}

/// Acknowledgement for an accepted submission. Correctness is revealed by
/// the round-close event, not here.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerResponse {
    /// Always true; rejections are reported as errors with a reason.
    pub accepted: bool,
}

impl SubmitAnswerResponse {
    /// The single success shape.
    pub fn accepted() -> Self {
        Self { accepted: true }
    }
}
