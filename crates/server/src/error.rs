//! API error types.

use crate::metrics;
use crate::response::ErrorResponse;
use axum::Json;
use axum::extract::rejection::BytesRejection;
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use fragments_model::FragmentError;

/// Challenge sent with every 401.
const BASIC_CHALLENGE: &str = r#"Basic realm="fragments""#;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    UnsupportedMediaType(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Fragment(#[from] FragmentError),
}

impl ApiError {
    /// Get the error code for this error, used as a metrics label.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::UnsupportedMediaType(_) => "unsupported_media_type",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::Internal(_) => "internal_error",
            Self::Fragment(e) => e.kind(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Fragment(e) => match e {
                FragmentError::Validation(_) => StatusCode::BAD_REQUEST,
                FragmentError::UnsupportedType(_)
                | FragmentError::UnsupportedConversion { .. } => {
                    StatusCode::UNSUPPORTED_MEDIA_TYPE
                }
                FragmentError::NotFound(_) => StatusCode::NOT_FOUND,
                FragmentError::Conversion(_) => StatusCode::UNPROCESSABLE_ENTITY,
                FragmentError::Storage(_) | FragmentError::Metadata(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Message shown to the client. Server-side failures are not described.
    fn public_message(&self) -> String {
        match self {
            Self::Fragment(FragmentError::NotFound(_)) => "fragment not found".to_string(),
            _ if self.status_code().is_server_error() => "internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge(rejection.body_text()),
            status if status.is_server_error() => ApiError::Internal(rejection.body_text()),
            _ => ApiError::BadRequest(rejection.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
        } else {
            tracing::warn!(error = %self, code, "request rejected");
        }
        metrics::API_ERRORS.with_label_values(&[code]).inc();

        let body = ErrorResponse::new(status.as_u16(), self.public_message());
        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static(BASIC_CHALLENGE));
        }
        response
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use fragments_storage::StorageError;

    #[test]
    fn test_fragment_error_statuses() {
        let cases = [
            (
                FragmentError::Validation("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                FragmentError::UnsupportedType("application/msword".to_string()),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                FragmentError::UnsupportedConversion {
                    from: "text/plain".to_string(),
                    to: "image/png".to_string(),
                },
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                FragmentError::NotFound("abc/f1".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                FragmentError::Conversion("invalid JSON".to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                FragmentError::Storage(StorageError::Config("down".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = ApiError::Fragment(FragmentError::Storage(StorageError::Config(
            "secret bucket name".to_string(),
        )));
        assert_eq!(err.public_message(), "internal server error");
        assert_eq!(err.code(), "storage");
    }

    #[test]
    fn test_unauthorized_sets_challenge() {
        let response = ApiError::Unauthorized("missing credentials".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(WWW_AUTHENTICATE).unwrap(),
            BASIC_CHALLENGE
        );
    }
}
