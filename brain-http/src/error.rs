//! The HTTP surface's error taxonomy (SPEC_FULL.md §7).
//!
//! Every route returns `Result<_, ApiError>`; `ApiError` carries its own
//! status code so handlers never construct a `StatusCode` by hand.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

/// Errors surfaced to HTTP callers.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad input: invalid cron expression, missing field, unauthorised
    /// skill mutation. Maps to 400.
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid bearer token. Maps to 401.
    #[error("unauthorized")]
    Unauthorized,

    /// Unknown conversation/skill/schedule/job/secret. Maps to 404.
    #[error("{0}")]
    NotFound(String),

    /// A wait exceeded its deadline. Maps to 504.
    #[error("{0}")]
    Timeout(String),

    /// Model provider, embedder, or bus failure. Logged by the caller
    /// before this is constructed; maps to 502.
    #[error("{0}")]
    Upstream(String),

    /// Anything else — programmer error, maps to 500.
    #[error("{0}")]
    Internal(String),
}

impl From<brain_store::StoreError> for ApiError {
    fn from(err: brain_store::StoreError) -> Self {
        match err {
            brain_store::StoreError::NotFound(id) => ApiError::NotFound(id),
            brain_store::StoreError::InvalidCron(msg) => ApiError::Validation(msg),
            brain_store::StoreError::JobTerminal(id) => {
                ApiError::Validation(format!("job {id} is already terminal"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<brain_schedule::ScheduleError> for ApiError {
    fn from(err: brain_schedule::ScheduleError) -> Self {
        match err {
            brain_schedule::ScheduleError::UnknownSchedule(id) => ApiError::NotFound(id),
            brain_schedule::ScheduleError::InvalidCron(msg) => ApiError::Validation(msg),
            brain_schedule::ScheduleError::Disabled(id) => {
                ApiError::Validation(format!("schedule {id} is disabled"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<brain_memory::MemoryError> for ApiError {
    fn from(err: brain_memory::MemoryError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

impl From<brain_proto::TurnError> for ApiError {
    fn from(err: brain_proto::TurnError) -> Self {
        tracing::error!(error = %err, "turn execution failed");
        ApiError::Upstream(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
