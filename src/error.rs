//! Error taxonomy for the service layer and its HTTP mapping.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::state::state_machine::InvalidTransition;

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Unauthorized access attempt (host token mismatch).
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Submission targets a question that is not the currently open round.
    #[error("submission rejected: question does not match the open round")]
    WrongRound,
    /// Submission arrived at or after the round's close time.
    #[error("submission rejected: round is closed")]
    RoundClosed,
    /// A submission was already accepted for this player and round.
    #[error("submission rejected: answer already recorded for this round")]
    AlreadyAnswered,
}

impl From<InvalidTransition> for ServiceError {
    fn from(err: InvalidTransition) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Machine-readable reason attached to submission rejections so clients can
/// distinguish "too late" from "duplicate" from "wrong question".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Question id does not match the currently open round.
    WrongRound,
    /// The round's close time has passed.
    RoundClosed,
    /// A submission already exists for this (player, round).
    AlreadyAnswered,
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Submission rejected for a reportable reason.
    #[error("rejected: {message}")]
    Rejected {
        /// Machine-readable rejection reason.
        reason: RejectReason,
        /// Human-readable description.
        message: String,
    },
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::Unauthorized(message) => AppError::Unauthorized(message),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::WrongRound => AppError::Rejected {
                reason: RejectReason::WrongRound,
                message,
            },
            ServiceError::RoundClosed => AppError::Rejected {
                reason: RejectReason::RoundClosed,
                message,
            },
            ServiceError::AlreadyAnswered => AppError::Rejected {
                reason: RejectReason::AlreadyAnswered,
                message,
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<RejectReason>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::Rejected { .. } => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let reason = match &self {
            AppError::Rejected { reason, .. } => Some(*reason),
            _ => None,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
            reason,
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_map_to_conflict_with_reason() {
        let app: AppError = ServiceError::RoundClosed.into();
        match app {
            AppError::Rejected { reason, .. } => assert_eq!(reason, RejectReason::RoundClosed),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn unauthorized_keeps_its_message() {
        let app: AppError = ServiceError::Unauthorized("bad host token".into()).into();
        match app {
            AppError::Unauthorized(message) => assert_eq!(message, "bad host token"),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn reason_codes_serialize_snake_case() {
        let json = serde_json::to_string(&RejectReason::AlreadyAnswered).unwrap();
        assert_eq!(json, "\"already_answered\"");
    }
}
