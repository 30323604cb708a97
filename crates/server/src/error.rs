// crates/server/src/error.rs
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use focus_guard_db::DbError;
use serde::Serialize;
use thiserror::Error;

/// Structured JSON error response for API errors
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// API error types that map to HTTP status codes
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Student not found: {0}")]
    StudentNotFound(String),

    #[error("Intervention {intervention_id} not found for student {student_id}")]
    InterventionNotFound {
        student_id: String,
        intervention_id: i64,
    },

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn missing_fields(fields: &[&str]) -> Self {
        ApiError::BadRequest(format!("Missing required fields: {}", fields.join(", ")))
    }
}

/// Malformed or non-JSON bodies are validation errors, not 422s.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            ApiError::StudentNotFound(id) => {
                tracing::warn!(student_id = %id, "Student not found");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::with_details("Student not found", format!("Student ID: {}", id)),
                )
            }
            ApiError::InterventionNotFound {
                student_id,
                intervention_id,
            } => {
                tracing::warn!(
                    student_id = %student_id,
                    intervention_id,
                    "Pending intervention not found"
                );
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::with_details(
                        "Intervention not found",
                        format!("Intervention ID: {}", intervention_id),
                    ),
                )
            }
            ApiError::Database(db_err) => {
                tracing::error!(error = %db_err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Database error"),
                )
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!(message = %msg, "Bad request");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::with_details("Bad request", msg.clone()),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
