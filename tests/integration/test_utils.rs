//! Test utilities for integration tests.
//!
//! Provides a canned image URL validator, a router wrapper that keeps the
//! shared state reachable, and request/response helpers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use bytes::Bytes;
use http_body_util::BodyExt;
use tower::ServiceExt;

use tagboard::error::ValidatorError;
use tagboard::server::{create_router, AppState, RouterConfig};
use tagboard::store::{sample_images, ImageStore, UserStore};
use tagboard::validator::ImageUrlValidator;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "password";

// =============================================================================
// Mock Validator
// =============================================================================

/// Validator answering from a fixed URL -> content type table.
///
/// Unknown URLs fail as unreachable. Every probe is counted.
#[derive(Default)]
pub struct MockValidator {
    content_types: HashMap<String, String>,
    probes: AtomicUsize,
}

impl MockValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `content_type` for `url`.
    pub fn with_url(mut self, url: &str, content_type: &str) -> Self {
        self.content_types
            .insert(url.to_string(), content_type.to_string());
        self
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageUrlValidator for MockValidator {
    async fn probe(&self, url: &str) -> Result<Option<String>, ValidatorError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        match self.content_types.get(url) {
            Some(content_type) => Ok(Some(content_type.clone())),
            None => Err(ValidatorError::Connection(format!("no route to {}", url))),
        }
    }
}

/// A validator knowing a handful of common test URLs.
pub fn default_validator() -> MockValidator {
    MockValidator::new()
        .with_url("https://img.example/cat.jpg", "image/jpeg")
        .with_url("https://img.example/dog.png", "image/png")
        .with_url("https://img.example/page.html", "text/html")
        .with_url("https://img.example/shouty.jpg", "IMAGE/JPEG")
}

// =============================================================================
// Test Application
// =============================================================================

/// A router together with the state it serves.
pub struct TestApp {
    pub state: AppState<MockValidator>,
    router: Router,
}

impl TestApp {
    /// Empty stores, no admin account.
    pub fn empty() -> Self {
        Self::with_state(AppState::new(default_validator()), RouterConfig::new())
    }

    /// The admin account and the two sample images, as at server startup.
    pub fn seeded() -> Self {
        let state = AppState::new(default_validator())
            .with_users(UserStore::with_admin(ADMIN_USERNAME, ADMIN_PASSWORD))
            .with_images(ImageStore::with_images(sample_images()));
        Self::with_state(state, RouterConfig::new())
    }

    pub fn with_state(state: AppState<MockValidator>, config: RouterConfig) -> Self {
        let router = create_router(state.clone(), config.with_tracing(false));
        Self { state, router }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Register `username` and log in, returning the `Cookie` header value.
    pub async fn login_new_user(&self, username: &str, password: &str) -> String {
        let response = self
            .send(post_json("/createUser", &credentials(username, password), None))
            .await;
        assert!(response.status().is_success());
        self.login(username, password).await
    }

    /// Log in an existing account, returning the `Cookie` header value.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .send(post_json("/authUser", &credentials(username, password), None))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        session_cookie(&response)
    }
}

// =============================================================================
// Request Builders
// =============================================================================

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

pub fn head(uri: &str) -> Request<Body> {
    Request::builder()
        .method("HEAD")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &serde_json::Value, cookie: Option<&str>) -> Request<Body> {
    post_raw(uri, body.to_string(), cookie)
}

pub fn post_raw(uri: &str, body: impl Into<Body>, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(body.into()).unwrap()
}

pub fn credentials(username: &str, password: &str) -> serde_json::Value {
    serde_json::json!({ "username": username, "password": password })
}

// =============================================================================
// Response Helpers
// =============================================================================

pub async fn body_bytes(response: Response) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a JSON error response with the given status and id.
pub async fn assert_error(response: Response, status: StatusCode, id: &str) {
    assert_eq!(response.status(), status);
    let json = json_body(response).await;
    assert_eq!(json["id"], id, "unexpected error body: {}", json);
    assert!(json["message"].is_string());
}

/// Turn a `Set-Cookie: session=...; Path=/` header into a `Cookie` value.
pub fn session_cookie(response: &Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("missing Set-Cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

/// The bare token inside a `session=<token>` cookie.
pub fn token_of(cookie: &str) -> &str {
    cookie.strip_prefix("session=").unwrap()
}
