use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with a health payload including the number of live rooms.
pub fn health_status(state: &SharedState) -> HealthResponse {
    HealthResponse::ok(state.rooms().len())
}
