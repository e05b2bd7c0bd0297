//! HTTP Basic authentication.
//!
//! Configured users are matched by email and SHA-256 password hash. A
//! successful login is mapped to the owner id derived from the email, so
//! handlers only ever see hashed identities.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use fragments_core::OwnerId;
use fragments_core::config::AuthConfig;
use fragments_core::owner::hex_encode;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use subtle::ConstantTimeEq;
use tracing::Instrument;

/// Authenticated request extension.
#[derive(Clone, Debug)]
pub struct AuthenticatedOwner {
    /// Hashed identity of the authenticated user.
    pub owner_id: OwnerId,
}

impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedOwner {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedOwner>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("authentication required".to_string()))
    }
}

struct UserEntry {
    password_hash: String,
    owner_id: OwnerId,
}

/// Users allowed to authenticate, keyed by email.
#[derive(Default)]
pub struct UserDirectory {
    users: HashMap<String, UserEntry>,
}

impl UserDirectory {
    pub fn from_config(config: &AuthConfig) -> Self {
        let users = config
            .users
            .iter()
            .map(|user| {
                (
                    user.email.clone(),
                    UserEntry {
                        password_hash: user.password_hash.to_ascii_lowercase(),
                        owner_id: OwnerId::from_email(&user.email),
                    },
                )
            })
            .collect();
        Self { users }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Owner id for valid credentials, `None` otherwise.
    pub fn authenticate(&self, email: &str, password: &str) -> Option<OwnerId> {
        let entry = self.users.get(email)?;
        let presented = hash_password(password);
        hashes_match(presented.as_bytes(), entry.password_hash.as_bytes())
            .then(|| entry.owner_id.clone())
    }
}

/// Lowercase hex SHA-256 of a password, the format stored in config.
pub fn hash_password(password: &str) -> String {
    hex_encode(&Sha256::digest(password.as_bytes()))
}

fn hashes_match(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Extract `(email, password)` from an `Authorization: Basic ...` header.
/// The scheme name is case-insensitive.
fn extract_basic_credentials(req: &Request) -> ApiResult<(String, String)> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing credentials".to_string()))?;

    let encoded = match header.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("basic") => rest.trim(),
        _ => return Err(ApiError::Unauthorized("expected Basic credentials".to_string())),
    };

    let decoded = STANDARD
        .decode(encoded)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| ApiError::Unauthorized("malformed credentials".to_string()))?;

    match decoded.split_once(':') {
        Some((email, password)) => Ok((email.to_string(), password.to_string())),
        None => Err(ApiError::Unauthorized("malformed credentials".to_string())),
    }
}

/// Authentication middleware for the fragment routes.
///
/// Rejects the request with 401 unless valid Basic credentials are present,
/// then runs the handler inside a span carrying the owner id.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (email, password) = extract_basic_credentials(&req)?;
    let owner_id = state
        .users
        .authenticate(&email, &password)
        .ok_or_else(|| ApiError::Unauthorized("invalid credentials".to_string()))?;

    let span = tracing::info_span!("request", owner_id = %owner_id);
    req.extensions_mut().insert(AuthenticatedOwner { owner_id });

    Ok(next.run(req).instrument(span).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with(header: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/v1/fragments");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_hash_password_matches_config_format() {
        assert_eq!(
            hash_password("password1"),
            "0b14d501a594442a01c6859541bcb3e8164d183d32937b851835442f69d5c94e"
        );
    }

    #[test]
    fn test_authenticate() {
        let users = UserDirectory::from_config(&AuthConfig::for_testing());
        assert_eq!(users.len(), 2);

        let owner = users.authenticate("user1@email.com", "password1").unwrap();
        assert_eq!(owner, OwnerId::from_email("user1@email.com"));

        assert!(users.authenticate("user1@email.com", "password2").is_none());
        assert!(users.authenticate("nobody@email.com", "password1").is_none());
    }

    #[test]
    fn test_hashes_match() {
        let hash = hash_password("password1");
        assert!(hashes_match(hash.as_bytes(), hash.as_bytes()));
        assert!(!hashes_match(
            hash.as_bytes(),
            hash_password("password2").as_bytes()
        ));
        assert!(!hashes_match(hash.as_bytes(), &hash.as_bytes()[..10]));
        assert!(!hashes_match(b"", hash.as_bytes()));
    }

    #[test]
    fn test_authenticate_accepts_uppercase_configured_hash() {
        let mut config = AuthConfig::for_testing();
        config.users[0].password_hash = hash_password("password1").to_ascii_uppercase();
        let users = UserDirectory::from_config(&config);
        assert!(users.authenticate(&config.users[0].email, "password1").is_some());
    }

    #[test]
    fn test_extract_basic_credentials() {
        let encoded = STANDARD.encode("user1@email.com:pass:word");
        let req = request_with(Some(&format!("basic {encoded}")));
        let (email, password) = extract_basic_credentials(&req).unwrap();
        assert_eq!(email, "user1@email.com");
        assert_eq!(password, "pass:word");
    }

    #[test]
    fn test_extract_rejects_missing_and_malformed() {
        assert!(extract_basic_credentials(&request_with(None)).is_err());
        assert!(extract_basic_credentials(&request_with(Some("Bearer abc"))).is_err());
        assert!(extract_basic_credentials(&request_with(Some("Basic !!!"))).is_err());

        let no_colon = STANDARD.encode("user1@email.com");
        let req = request_with(Some(&format!("Basic {no_colon}")));
        assert!(matches!(
            extract_basic_credentials(&req),
            Err(ApiError::Unauthorized(_))
        ));
    }
}
