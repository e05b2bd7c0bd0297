//! Server test utilities.

use super::fixtures::basic_auth;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use bytes::Bytes;
use fragments_core::config::AppConfig;
use fragments_metadata::{MetadataStore, SqliteStore};
use fragments_model::Stores;
use fragments_server::{AppState, create_router};
use fragments_storage::{DataStore, FilesystemBackend};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// A response captured for assertions.
#[allow(dead_code)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[allow(dead_code)]
impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    _temp_dir: Option<TempDir>,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a test server backed by in-memory stores.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create an in-memory test server with custom config modifications.
    pub fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = AppConfig::for_testing();
        modifier(&mut config);
        let state = AppState::new(config, Stores::in_memory());
        Self {
            router: create_router(state.clone()),
            state,
            _temp_dir: None,
        }
    }

    /// Create a test server backed by SQLite and the filesystem in a temp dir.
    pub async fn persistent() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let data: Arc<dyn DataStore> = Arc::new(
            FilesystemBackend::new(temp_dir.path().join("data"))
                .await
                .expect("Failed to create data store"),
        );
        let metadata: Arc<dyn MetadataStore> = Arc::new(
            SqliteStore::new(temp_dir.path().join("metadata.db"))
                .await
                .expect("Failed to create metadata store"),
        );

        let state = AppState::new(AppConfig::for_testing(), Stores::new(metadata, data));
        Self {
            router: create_router(state.clone()),
            state,
            _temp_dir: Some(temp_dir),
        }
    }

    /// Send a request, optionally authenticated and with a typed body.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        user: Option<(&str, &str)>,
        content: Option<(&str, Bytes)>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("Authorization", basic_auth(user));
        }
        let body = match content {
            Some((content_type, data)) => {
                builder = builder.header("Content-Type", content_type);
                Body::from(data)
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// GET as `user`.
    pub async fn get(&self, uri: &str, user: (&str, &str)) -> TestResponse {
        self.send("GET", uri, Some(user), None).await
    }

    /// POST a fragment as `user` and return the response.
    pub async fn post_fragment(
        &self,
        user: (&str, &str),
        content_type: &str,
        data: impl Into<Bytes>,
    ) -> TestResponse {
        self.send(
            "POST",
            "/v1/fragments",
            Some(user),
            Some((content_type, data.into())),
        )
        .await
    }

    /// POST a fragment as `user` and return its id, asserting it was created.
    pub async fn create_fragment(
        &self,
        user: (&str, &str),
        content_type: &str,
        data: impl Into<Bytes>,
    ) -> String {
        let response = self.post_fragment(user, content_type, data).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
        response.json()["fragment"]["id"]
            .as_str()
            .expect("created fragment has an id")
            .to_string()
    }
}
