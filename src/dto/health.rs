use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Health status, currently always "ok".
    pub status: String,
    /// Number of live rooms held in memory.
    pub live_rooms: usize,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(live_rooms: usize) -> Self {
        Self {
            status: "ok".to_string(),
            live_rooms,
        }
    }
}
