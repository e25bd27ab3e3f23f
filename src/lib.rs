//! # Tagboard
//!
//! A small multi-user image board served over HTTP.
//!
//! Users register, log in with a session cookie, and post links to remote
//! images tagged with keywords. Anyone can query images by tag or uploader;
//! admins can delete images and users.
//!
//! ## Features
//!
//! - **Session auth**: cookie-based sessions with a per-endpoint policy
//! - **Tag search**: superset matching over `~`-separated tag lists
//! - **URL validation**: uploads are probed and must report an `image/*` type
//! - **Built-in client**: a single-page HTML client served at `/`
//!
//! ## Architecture
//!
//! - [`store`] - In-memory user, session, and image stores
//! - [`validator`] - Image URL probing
//! - [`query`] - Request target parsing
//! - [`server`] - Axum-based HTTP server, auth gate, and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use tagboard::{create_router, AppState, PermissiveValidator, RouterConfig, UserStore};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let state = AppState::new(PermissiveValidator)
//!         .with_users(UserStore::with_admin("admin", "password"));
//!     let router = create_router(state, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, router).await
//! }
//! ```

pub mod config;
pub mod error;
pub mod query;
pub mod server;
pub mod store;
pub mod validator;

// Re-export commonly used types
pub use config::Config;
pub use error::{ApiError, AssetError, ValidatorError};
pub use query::{parse_query, split_tags, ParsedQuery};
pub use server::{
    create_router, AppState, ClientAssets, ErrorResponse, HealthResponse, ResponseWriter,
    RouterConfig,
};
pub use store::{sample_images, Image, ImageStore, SessionStore, User, UserCreation, UserStore};
pub use validator::{
    check_image_url, HttpHeadValidator, ImageUrlValidator, PermissiveValidator, UrlVerdict,
};
