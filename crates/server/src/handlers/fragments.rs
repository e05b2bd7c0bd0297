//! Fragment endpoints.
//!
//! Every handler runs behind [`crate::auth::auth_middleware`] and only ever
//! touches fragments of the authenticated owner.

use crate::auth::AuthenticatedOwner;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::response::{Empty, ok};
use crate::state::AppState;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_TYPE, HOST, LOCATION};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use fragments_core::{FragmentId, base_type};
use fragments_model::{Fragment, FragmentList, NewFragment};
use serde::{Deserialize, Serialize};

/// Query parameters for listing fragments.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// `1` or `true` returns full metadata instead of ids.
    pub expand: Option<String>,
}

impl ListQuery {
    fn expand(&self) -> bool {
        matches!(self.expand.as_deref(), Some("1" | "true"))
    }
}

#[derive(Debug, Serialize)]
pub struct FragmentsBody {
    pub fragments: FragmentList,
}

#[derive(Debug, Serialize)]
pub struct FragmentBody {
    pub fragment: Fragment,
}

/// Fragment metadata plus the types it can be rendered as.
#[derive(Debug, Serialize)]
pub struct FragmentInfo {
    #[serde(flatten)]
    pub fragment: Fragment,
    pub formats: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct FragmentInfoBody {
    pub fragment: FragmentInfo,
}

/// An id that cannot be valid cannot name a stored fragment either.
fn parse_id(raw: &str) -> ApiResult<FragmentId> {
    FragmentId::parse(raw).map_err(|_| ApiError::NotFound("fragment not found".to_string()))
}

async fn load_fragment(
    state: &AppState,
    owner: &AuthenticatedOwner,
    id: &FragmentId,
) -> ApiResult<Fragment> {
    Fragment::by_id(&state.stores, &owner.owner_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("fragment not found".to_string()))
}

fn request_content_type(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Public URL of a fragment: `server.api_url` when configured, otherwise
/// built from `X-Forwarded-Proto` and `Host`.
fn fragment_location(state: &AppState, headers: &HeaderMap, id: &FragmentId) -> String {
    let base = match &state.config.server.api_url {
        Some(url) => url.trim_end_matches('/').to_string(),
        None => {
            let proto = headers
                .get("x-forwarded-proto")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("http");
            let host = headers
                .get(HOST)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("localhost:8080");
            format!("{proto}://{host}")
        }
    };
    format!("{base}/v1/fragments/{id}")
}

/// Text responses declare utf-8 unless the stored type names a charset.
fn response_content_type(media_type: &str) -> ApiResult<HeaderValue> {
    let value = if media_type.starts_with("text/") && !media_type.contains("charset") {
        format!("{media_type}; charset=utf-8")
    } else {
        media_type.to_string()
    };
    HeaderValue::from_str(&value)
        .map_err(|_| ApiError::Internal(format!("invalid stored media type {media_type:?}")))
}

fn data_response(media_type: &str, data: Bytes) -> ApiResult<Response> {
    Ok(([(CONTENT_TYPE, response_content_type(media_type)?)], data).into_response())
}

/// GET /v1/fragments
pub async fn list_fragments(
    State(state): State<AppState>,
    owner: AuthenticatedOwner,
    Query(query): Query<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    let fragments = Fragment::by_user(&state.stores, &owner.owner_id, query.expand()).await?;
    tracing::debug!(count = fragments.len(), expand = query.expand(), "listed fragments");
    Ok(ok(FragmentsBody { fragments }))
}

/// POST /v1/fragments
///
/// The body is the fragment data and `Content-Type` its type.
pub async fn create_fragment(
    State(state): State<AppState>,
    owner: AuthenticatedOwner,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<impl IntoResponse> {
    let media_type = request_content_type(&headers)
        .ok_or_else(|| ApiError::UnsupportedMediaType("Content-Type is required".to_string()))?;
    let data = body?;

    let mut fragment = Fragment::with_policy(
        NewFragment::new(owner.owner_id.as_str(), media_type),
        &state.policy,
    )?;
    let size = data.len();
    fragment.set_data(&state.stores, data).await?;
    metrics::record_write(true, size);

    let location = fragment_location(&state, &headers, fragment.id());
    tracing::info!(id = %fragment.id(), media_type = fragment.media_type(), size, "fragment created");

    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        ok(FragmentBody { fragment }),
    ))
}

/// GET /v1/fragments/{id} and GET /v1/fragments/{id}.{ext}
///
/// Without an extension the stored data is returned as-is; with one it is
/// converted first.
pub async fn get_fragment(
    State(state): State<AppState>,
    owner: AuthenticatedOwner,
    Path(raw): Path<String>,
) -> ApiResult<Response> {
    let (raw_id, ext) = match raw.rsplit_once('.') {
        Some((id, ext)) => (id, Some(ext)),
        None => (raw.as_str(), None),
    };
    let id = parse_id(raw_id)?;
    let fragment = load_fragment(&state, &owner, &id).await?;

    match ext {
        None => {
            let data = fragment.get_data(&state.stores).await?;
            data_response(fragment.media_type(), data)
        }
        Some(ext) => {
            let (target, data) = fragment.converted_data(&state.stores, ext).await?;
            metrics::CONVERSIONS.with_label_values(&[target]).inc();
            tracing::debug!(id = %id, from = fragment.mime_type(), to = target, "converted fragment");
            data_response(target, data)
        }
    }
}

/// GET /v1/fragments/{id}/info
pub async fn get_fragment_info(
    State(state): State<AppState>,
    owner: AuthenticatedOwner,
    Path(raw): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&raw)?;
    let fragment = load_fragment(&state, &owner, &id).await?;
    let formats = fragment.formats();
    Ok(ok(FragmentInfoBody {
        fragment: FragmentInfo { fragment, formats },
    }))
}

/// PUT /v1/fragments/{id}
///
/// Replaces the data of an existing fragment. The type cannot change.
pub async fn update_fragment(
    State(state): State<AppState>,
    owner: AuthenticatedOwner,
    Path(raw): Path<String>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<impl IntoResponse> {
    let media_type = request_content_type(&headers)
        .ok_or_else(|| ApiError::BadRequest("Content-Type is required".to_string()))?;
    if !state.policy.is_supported(media_type) {
        return Err(ApiError::UnsupportedMediaType(format!(
            "unsupported type: {media_type}"
        )));
    }
    let new_base = base_type(media_type).map_err(fragments_model::FragmentError::from)?;
    let data = body?;

    let id = parse_id(&raw)?;
    let mut fragment = load_fragment(&state, &owner, &id).await?;
    if fragment.mime_type() != new_base {
        return Err(ApiError::BadRequest(format!(
            "fragment type cannot be changed from {} to {new_base}",
            fragment.mime_type()
        )));
    }

    let size = data.len();
    fragment.set_data(&state.stores, data).await?;
    metrics::record_write(false, size);

    let location = fragment_location(&state, &headers, fragment.id());
    tracing::info!(id = %id, size, "fragment updated");

    Ok(([(LOCATION, location)], ok(FragmentBody { fragment })))
}

/// DELETE /v1/fragments/{id}
///
/// Idempotent: deleting a fragment that does not exist succeeds.
pub async fn delete_fragment(
    State(state): State<AppState>,
    owner: AuthenticatedOwner,
    Path(raw): Path<String>,
) -> ApiResult<impl IntoResponse> {
    if let Ok(id) = FragmentId::parse(raw.as_str()) {
        Fragment::delete(&state.stores, &owner.owner_id, &id).await?;
        metrics::FRAGMENTS_DELETED.inc();
        tracing::info!(id = %id, "fragment deleted");
    }
    Ok(ok(Empty::default()))
}
