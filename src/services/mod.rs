//! Service layer coordinating room state, timers, and broadcasts.

/// OpenAPI documentation generation.
pub mod documentation;
/// Background eviction of finished and abandoned rooms.
pub mod eviction;
/// Health check service.
pub mod health_service;
/// Core room lifecycle and submission handling.
pub mod room_service;
/// Per-round deadline scheduling.
pub mod round_timer;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
