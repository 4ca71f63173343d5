//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::core_state::CoreError;
use crate::intake::IntakeError;
use crate::places::PlacesError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Precondition failed: {0}")]
    Precondition(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("Upstream error: {0}")]
    Upstream(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail),
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail),
            ApiError::Precondition(detail) => {
                (StatusCode::BAD_REQUEST, "PRECONDITION_FAILED", detail)
            }
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, "CONFLICT", detail),
            ApiError::Unavailable(detail) => {
                (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", detail)
            }
            ApiError::Upstream(detail) => {
                tracing::warn!(detail = %detail, "Upstream service error");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM",
                    "An upstream service failed".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::AnalysisInProgress => ApiError::Conflict(err.to_string()),
            IntakeError::EmptySelection | IntakeError::MissingAge => {
                ApiError::Precondition(err.to_string())
            }
            IntakeError::InvalidAge(_)
            | IntakeError::UnknownAgeBucket(_)
            | IntakeError::EmptySymptomName
            | IntakeError::InvalidSeverity(_)
            | IntakeError::UnknownSymptom { .. } => ApiError::BadRequest(err.to_string()),
            IntakeError::MalformedResponse(_)
            | IntakeError::MissingField(_)
            | IntakeError::InvalidUrgency(_)
            | IntakeError::Provider(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownSession(id) => ApiError::NotFound(format!("session {id}")),
            CoreError::LockPoisoned => ApiError::Internal("lock poisoned".into()),
            CoreError::Intake(e) => e.into(),
        }
    }
}

impl From<PlacesError> for ApiError {
    fn from(err: PlacesError) -> Self {
        match err {
            PlacesError::EmptyDepartment | PlacesError::InvalidCoordinate { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            PlacesError::Http(_) | PlacesError::Service { .. } | PlacesError::Malformed(_) => {
                ApiError::Upstream(err.to_string())
            }
        }
    }
}
