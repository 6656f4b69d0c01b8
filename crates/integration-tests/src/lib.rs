//! Integration tests for bintrack.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bintrack-integration-tests
//! ```
//!
//! The tests drive the real application router in-process, backed by the
//! in-memory item store, an in-memory platform repository and a temporary
//! upload directory. No database or running server is needed.
//!
//! # Test Categories
//!
//! - `inventory_api` - Item lifecycle, search, photo search, shipping worklist
//! - `platforms_api` - Platform list management
//! - `upload_api` - Image uploads and serving
//! - `service_api` - Health checks and request IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use bintrack_server::config::ServerConfig;
use bintrack_server::db::MemoryItemStore;
use bintrack_server::services::MemoryPlatformRepository;
use bintrack_server::{AppState, app};

/// Upload limit used by test apps, small enough to exceed cheaply.
pub const TEST_MAX_UPLOAD_BYTES: usize = 64 * 1024;

/// A fully wired application with throwaway storage.
pub struct TestApp {
    router: Router,
    state: AppState,
    store: Arc<MemoryItemStore>,
    platforms: Arc<MemoryPlatformRepository>,
    _uploads: TempDir,
}

/// A response with its body collected.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Body parsed as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }
}

impl TestApp {
    /// Build an app with default configuration.
    ///
    /// # Panics
    ///
    /// Panics if the temporary upload directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let uploads = TempDir::new().expect("failed to create upload dir");
        let upload_dir = uploads.path().to_string_lossy().into_owned();
        let max_bytes = TEST_MAX_UPLOAD_BYTES.to_string();

        let config = ServerConfig::from_vars(|key| match key {
            "UPLOAD_DIR" => Some(upload_dir.clone()),
            "MAX_UPLOAD_BYTES" => Some(max_bytes.clone()),
            _ => None,
        })
        .expect("test configuration is valid");

        let store = Arc::new(MemoryItemStore::new());
        let platforms = Arc::new(MemoryPlatformRepository::new());
        let state = AppState::new(config, store.clone(), platforms.clone());

        Self {
            router: app(state.clone()),
            state,
            store,
            platforms,
            _uploads: uploads,
        }
    }

    /// Shared application state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// The item store behind the app.
    #[must_use]
    pub const fn store(&self) -> &Arc<MemoryItemStore> {
        &self.store
    }

    /// The platform repository behind the app.
    #[must_use]
    pub const fn platform_repository(&self) -> &Arc<MemoryPlatformRepository> {
        &self.platforms
    }

    /// Send a request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the router or body collection fails.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("failed to read body")
            .to_bytes()
            .to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// `GET` a path.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(request("GET", uri, Body::empty())).await
    }

    /// `DELETE` a path.
    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(request("DELETE", uri, Body::empty())).await
    }

    /// Send a JSON body with the given method.
    pub async fn json(&self, method: &str, uri: &str, body: &Value) -> TestResponse {
        let mut req = request(method, uri, Body::from(body.to_string()));
        req.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        self.send(req).await
    }

    /// Create an item and return its JSON representation.
    ///
    /// # Panics
    ///
    /// Panics if the item is not created.
    pub async fn create_item(&self, body: &Value) -> Value {
        let response = self.json("POST", "/api/inventory", body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.json());
        response.json()
    }

    /// Upload bytes as the `image` field of a multipart form.
    pub async fn upload(&self, filename: &str, content_type: &str, bytes: &[u8]) -> TestResponse {
        self.upload_field("image", filename, content_type, bytes).await
    }

    /// Upload bytes under an arbitrary multipart field name.
    pub async fn upload_field(
        &self,
        field: &str,
        filename: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> TestResponse {
        const BOUNDARY: &str = "bintrack-test-boundary";

        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let mut req = request("POST", "/api/upload/image", Body::from(body));
        req.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_str(&format!("multipart/form-data; boundary={BOUNDARY}"))
                .expect("boundary is a valid header value"),
        );
        self.send(req).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

fn request(method: &str, uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(body)
        .expect("valid request")
}
