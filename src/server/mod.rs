//! HTTP server layer for Tagboard.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │                                                                 │
//! │  ┌────────────┐  ┌─────────────┐  ┌──────────────────────────┐  │
//! │  │   routes   │  │    auth     │  │        negotiate         │  │
//! │  │ (dispatch) │  │ (sessions)  │  │     (Accept check)       │  │
//! │  └────────────┘  └─────────────┘  └──────────────────────────┘  │
//! │  ┌────────────┐  ┌─────────────┐  ┌──────────────────────────┐  │
//! │  │  handlers  │  │    body     │  │        response          │  │
//! │  │ (endpoints)│  │ (collector) │  │  (HEAD-aware writer)     │  │
//! │  └────────────┘  └─────────────┘  └──────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod assets;
pub mod auth;
pub mod body;
pub mod handlers;
pub mod negotiate;
pub mod response;
pub mod routes;

pub use assets::ClientAssets;
pub use auth::{
    auth_middleware, authorize_request, endpoint_requires_admin, validate_session, ActiveSession,
    SessionContext, PROTECTED_ENDPOINTS, SESSION_COOKIE,
};
pub use body::CollectedBody;
pub use handlers::{
    health_handler, session_cookie, AppState, ErrorResponse, HealthResponse, MessageResponse,
};
pub use negotiate::{accept_middleware, accepts_supported_type, SUPPORTED_MEDIA_TYPES};
pub use response::{ResponseWriter, APPLICATION_JSON};
pub use routes::{create_router, RouterConfig, DEFAULT_MAX_BODY_BYTES};
