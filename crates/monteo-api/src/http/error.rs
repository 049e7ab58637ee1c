//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use monteo_types::error::EngineError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Engine / service errors.
    Engine(EngineError),
    /// Authentication failure.
    Unauthorized(String),
    /// Generic internal error.
    Internal(String),
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        AppError::Engine(e)
    }
}

/// HTTP status and machine-readable code for an error.
pub fn status_and_code(error: &AppError) -> (StatusCode, &'static str) {
    match error {
        AppError::Engine(EngineError::UnknownStatus(_)) => {
            (StatusCode::BAD_REQUEST, "UNKNOWN_STATUS")
        }
        AppError::Engine(EngineError::Validation(_)) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
        }
        AppError::Engine(EngineError::PolicyViolation(_)) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "POLICY_VIOLATION")
        }
        AppError::Engine(EngineError::Forbidden(_)) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        AppError::Engine(EngineError::NotFound(_)) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        AppError::Engine(EngineError::Conflict(_)) => (StatusCode::CONFLICT, "CONFLICT"),
        AppError::Engine(EngineError::Storage(_)) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
        }
        AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = status_and_code(&self);
        let message = match &self {
            AppError::Engine(e) => e.to_string(),
            AppError::Unauthorized(msg) | AppError::Internal(msg) => msg.clone(),
        };

        let body = json!({
            "data": null,
            "meta": {
                "request_id": "",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "response_time_ms": 0
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
