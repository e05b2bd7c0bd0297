//! Response envelopes.
//!
//! Success bodies are `{"status": "ok", ...fields}`; errors are
//! `{"status": "error", "error": {"code": <http status>, "message": ...}}`
//! (see [`crate::error::ApiError`]).

use axum::Json;
use serde::Serialize;

/// `{"status": "ok"}` merged with the fields of `body`.
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    status: &'static str,
    #[serde(flatten)]
    body: T,
}

/// A success body with no extra fields.
#[derive(Debug, Default, Serialize)]
pub struct Empty {}

/// Wrap `body` in the success envelope.
pub fn ok<T: Serialize>(body: T) -> Json<SuccessResponse<T>> {
    Json(SuccessResponse { status: "ok", body })
}

/// Error details inside the error envelope.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// HTTP status code.
    pub code: u16,
    /// Human-readable error message.
    pub message: String,
}

/// `{"status": "error", "error": {...}}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub error: ErrorBody,
}

impl ErrorResponse {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            status: "error",
            error: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }
}
