//! Unauthenticated service endpoints.

use crate::error::{ApiError, ApiResult};
use crate::response::{Empty, ok};
use crate::state::AppState;
use axum::extract::State;
use axum::http::header::CACHE_CONTROL;
use axum::response::IntoResponse;
use serde::Serialize;

/// Service info response.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
}

/// GET /
pub async fn service_info() -> impl IntoResponse {
    (
        [(CACHE_CONTROL, "no-cache")],
        ok(ServiceInfo {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// GET /v1/health
///
/// Intentionally unauthenticated for load balancer probes.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    state
        .stores
        .metadata
        .health_check()
        .await
        .map_err(|e| ApiError::Internal(format!("metadata store unhealthy: {e}")))?;
    Ok(([(CACHE_CONTROL, "no-cache")], ok(Empty::default())))
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("not found".to_string())
}
