//! Router configuration for Tagboard.
//!
//! This module defines the HTTP routes and applies middleware for
//! authorization, content negotiation, body limits, CORS, and tracing.
//!
//! # Route Structure
//!
//! ```text
//! /                 GET   - Client page (public)
//! /style.css        GET   - Client stylesheet (public)
//! /health           GET   - Health check (public)
//! /createUser       POST  - Register (public)
//! /authUser         POST  - Log in (public)
//! /getSessionUser   GET   - Current user (session)
//! /addImage         POST  - Upload an image (session)
//! /getImages        GET   - Query by tags (public)
//! /getUploads       GET   - Query by uploader (public)
//! /deleteImage      POST  - Remove an image (admin)
//! /deleteUser       POST  - Remove a user (admin)
//! ```
//!
//! Requests pass through the layers outermost first:
//!
//! ```text
//! trace -> cors -> body limit -> auth gate -> accept check -> handler
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tagboard::server::{create_router, AppState, RouterConfig};
//! use tagboard::validator::PermissiveValidator;
//!
//! let state = AppState::new(PermissiveValidator);
//! let router = create_router(state, RouterConfig::new());
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use http::header::{CONTENT_TYPE, COOKIE};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::auth::auth_middleware;
use super::handlers::{
    add_image_handler, auth_user_handler, create_user_handler, delete_image_handler,
    delete_user_handler, health_handler, images_handler, index_handler,
    method_not_allowed_handler, not_found_handler, session_user_handler, style_handler,
    uploads_handler, AppState,
};
use super::negotiate::accept_middleware;
use crate::validator::ImageUrlValidator;

/// Default request body limit (64 KiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,

    /// Largest accepted request body in bytes
    pub max_body_bytes: usize,
}

impl RouterConfig {
    /// Create a router configuration.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Tracing is enabled
    /// - Bodies are limited to [`DEFAULT_MAX_BODY_BYTES`]
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            enable_tracing: true,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }

    /// Set the request body limit.
    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// Every request first passes the auth gate, then the `Accept` check, and
/// is then dispatched on its exact path. Unmapped paths answer 404; mapped
/// paths called with the wrong method answer 405.
pub fn create_router<V>(state: AppState<V>, config: RouterConfig) -> Router
where
    V: ImageUrlValidator + 'static,
{
    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/", get(index_handler::<V>))
        .route("/style.css", get(style_handler::<V>))
        .route("/health", get(health_handler))
        .route("/createUser", post(create_user_handler::<V>))
        .route("/authUser", post(auth_user_handler::<V>))
        .route("/getSessionUser", get(session_user_handler))
        .route("/addImage", post(add_image_handler::<V>))
        .route("/getImages", get(images_handler::<V>))
        .route("/getUploads", get(uploads_handler::<V>))
        .route("/deleteImage", post(delete_image_handler::<V>))
        .route("/deleteUser", post(delete_user_handler::<V>))
        .fallback(not_found_handler)
        .method_not_allowed_fallback(method_not_allowed_handler)
        // Innermost first: the auth gate runs before the Accept check
        .layer(middleware::from_fn(accept_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<V>,
        ))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, COOKIE])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
