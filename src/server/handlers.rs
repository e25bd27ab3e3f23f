//! HTTP request handlers for the Tagboard API.
//!
//! # Endpoints
//!
//! - `GET /` and `GET /style.css` - Client page and stylesheet
//! - `POST /createUser` - Register an account
//! - `POST /authUser` - Log in and receive a session cookie
//! - `GET /getSessionUser` - The user behind the current session
//! - `POST /addImage` - Upload a tagged image URL
//! - `GET /getImages?tags=a~b` - Images carrying every listed tag
//! - `GET /getUploads?user=name` - Images uploaded by a user
//! - `POST /deleteImage` - Remove every record of an image URL (admin)
//! - `POST /deleteUser` - Remove a user and their sessions (admin)
//! - `GET /health` - Health check
//!
//! Authorization has already been decided by the time a handler runs; see
//! [`super::auth`].
//!
//! Every response, errors included, goes through the request's
//! [`ResponseWriter`] so `HEAD` requests never receive a body. A mapped path
//! called with a method it does not serve answers
//! `405 {"id": "methodNotAllowed"}` rather than `404`.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::ApiError;
use crate::query::{split_tags, ParsedQuery};
use crate::store::{ImageStore, SessionStore, User, UserCreation, UserStore};
use crate::validator::ImageUrlValidator;

use super::assets::ClientAssets;
use super::auth::{SessionContext, SESSION_COOKIE};
use super::body::CollectedBody;
use super::response::ResponseWriter;

const TEXT_HTML: &str = "text/html";
const TEXT_CSS: &str = "text/css";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state.
///
/// Every store is owned here and handed to handlers through Axum's `State`
/// extractor. Cross-store operations lock `users` before `sessions`.
pub struct AppState<V: ImageUrlValidator> {
    /// Registered accounts
    pub users: Arc<UserStore>,

    /// Live session tokens
    pub sessions: Arc<SessionStore>,

    /// Uploaded images
    pub images: Arc<ImageStore>,

    /// Probe used to accept or reject uploaded image URLs
    pub validator: Arc<V>,

    /// Client page and stylesheet
    pub assets: Arc<ClientAssets>,
}

impl<V: ImageUrlValidator> AppState<V> {
    /// Create state with empty stores and the built-in client assets.
    pub fn new(validator: V) -> Self {
        Self {
            users: Arc::new(UserStore::new()),
            sessions: Arc::new(SessionStore::new()),
            images: Arc::new(ImageStore::new()),
            validator: Arc::new(validator),
            assets: Arc::new(ClientAssets::builtin()),
        }
    }

    /// Replace the user store.
    pub fn with_users(mut self, users: UserStore) -> Self {
        self.users = Arc::new(users);
        self
    }

    /// Replace the image store.
    pub fn with_images(mut self, images: ImageStore) -> Self {
        self.images = Arc::new(images);
        self
    }

    /// Serve `assets` instead of the built-in client.
    pub fn with_assets(mut self, assets: ClientAssets) -> Self {
        self.assets = Arc::new(assets);
        self
    }
}

impl<V: ImageUrlValidator> Clone for AppState<V> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            sessions: Arc::clone(&self.sessions),
            images: Arc::clone(&self.images),
            validator: Arc::clone(&self.validator),
            assets: Arc::clone(&self.assets),
        }
    }
}

// =============================================================================
// Request Bodies
// =============================================================================

/// Body of `/createUser` and `/authUser`.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsBody {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Body of `/addImage`.
#[derive(Debug, Default, Deserialize)]
pub struct AddImageBody {
    /// Remote image URL
    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub tags: Option<Vec<String>>,

    #[serde(default)]
    pub uploader: Option<String>,
}

/// Body of `/deleteImage`.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteImageBody {
    #[serde(default)]
    pub url: Option<String>,
}

/// Body of `/deleteUser`.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteUserBody {
    /// Name of the account to delete
    #[serde(default)]
    pub user: Option<String>,
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub message: String,

    /// Stable error identifier (e.g. "missingParams")
    pub id: String,
}

/// Success message body (`{"message": ...}`).
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Body of `/getSessionUser`.
#[derive(Debug, Serialize)]
pub struct SessionUserResponse {
    pub user: User,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Map an API error to its status and JSON body.
///
/// A failed body stream has no JSON body. Errors are logged by severity:
/// 404s and auth denials at DEBUG, other client errors at WARN.
pub(crate) fn render_error(err: &ApiError) -> (StatusCode, Option<ErrorResponse>) {
    let status = match err {
        ApiError::MissingParams(_)
        | ApiError::InvalidParams(_)
        | ApiError::MalformedBody { .. }
        | ApiError::BodyStream { .. } => StatusCode::BAD_REQUEST,
        ApiError::Unauthorized => StatusCode::FORBIDDEN,
        ApiError::NotFound => StatusCode::NOT_FOUND,
        ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
    };

    match err {
        ApiError::Unauthorized | ApiError::NotFound => debug!(
            error_id = err.id(),
            status = status.as_u16(),
            "Request refused: {}",
            err
        ),
        _ => warn!(
            error_id = err.id(),
            status = status.as_u16(),
            "Client error: {}",
            err
        ),
    }

    let body = match err {
        ApiError::BodyStream { .. } => None,
        ApiError::MalformedBody { .. } => Some(ErrorResponse {
            message: "Malformed request body".to_string(),
            id: err.id().to_string(),
        }),
        _ => Some(ErrorResponse {
            message: err.to_string(),
            id: err.id().to_string(),
        }),
    };

    (status, body)
}

// =============================================================================
// Static Assets
// =============================================================================

/// Serve the client page.
///
/// `GET /`
pub async fn index_handler<V: ImageUrlValidator>(
    State(state): State<AppState<V>>,
    writer: ResponseWriter,
) -> Response {
    writer.send(
        StatusCode::OK,
        Some(TEXT_HTML),
        Some(state.assets.index_html.clone()),
    )
}

/// Serve the client stylesheet.
///
/// `GET /style.css`
pub async fn style_handler<V: ImageUrlValidator>(
    State(state): State<AppState<V>>,
    writer: ResponseWriter,
) -> Response {
    writer.send(
        StatusCode::OK,
        Some(TEXT_CSS),
        Some(state.assets.style_css.clone()),
    )
}

/// Health check endpoint.
///
/// `GET /health` returns `{"status": "healthy", "version": "..."}`.
pub async fn health_handler(writer: ResponseWriter) -> Response {
    writer.json(
        StatusCode::OK,
        &HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    )
}

// =============================================================================
// Accounts
// =============================================================================

/// Register a new account.
///
/// `POST /createUser {username, password}`
///
/// - `201 {"message": "Created successfully"}` for a new account
/// - `204` (no body) if the username is already taken
pub async fn create_user_handler<V: ImageUrlValidator>(
    State(state): State<AppState<V>>,
    writer: ResponseWriter,
    CollectedBody(body): CollectedBody<CredentialsBody>,
) -> Result<Response, Response> {
    let username = body.username.unwrap_or_default();
    let password = body.password.unwrap_or_default();

    match state
        .users
        .create_user(&username, &password)
        .await
        .map_err(|e| writer.error(e))?
    {
        UserCreation::Created => Ok(writer.json(
            StatusCode::CREATED,
            &MessageResponse {
                message: "Created successfully",
            },
        )),
        UserCreation::AlreadyExists => Ok(writer.send(StatusCode::NO_CONTENT, None, None)),
    }
}

/// Log in.
///
/// `POST /authUser {username, password}` answers
/// `200 {"message": "Authorized successfully"}` and sets the session cookie.
pub async fn auth_user_handler<V: ImageUrlValidator>(
    State(state): State<AppState<V>>,
    writer: ResponseWriter,
    CollectedBody(body): CollectedBody<CredentialsBody>,
) -> Result<Response, Response> {
    let username = body.username.unwrap_or_default();
    let password = body.password.unwrap_or_default();

    let token = state
        .users
        .authenticate(&state.sessions, &username, &password)
        .await
        .map_err(|e| writer.error(e))?;

    let mut response = writer.json(
        StatusCode::OK,
        &MessageResponse {
            message: "Authorized successfully",
        },
    );
    match HeaderValue::from_str(&session_cookie(&token)) {
        Ok(cookie) => {
            response.headers_mut().insert(header::SET_COOKIE, cookie);
        }
        Err(e) => error!("Session token is not a valid header value: {}", e),
    }
    Ok(response)
}

/// `Set-Cookie` value for a freshly issued session.
pub fn session_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly", SESSION_COOKIE, token)
}

/// The user the request's session belongs to.
///
/// `GET /getSessionUser` answers `{"user": {username, password, isAdmin}}`.
pub async fn session_user_handler(
    writer: ResponseWriter,
    SessionContext(session): SessionContext,
) -> Response {
    match session {
        Some(session) => writer.json(StatusCode::OK, &SessionUserResponse { user: session.user }),
        None => writer.error(ApiError::Unauthorized),
    }
}

/// Delete an account and every session issued to it.
///
/// `POST /deleteUser {user}` answers `204`.
pub async fn delete_user_handler<V: ImageUrlValidator>(
    State(state): State<AppState<V>>,
    writer: ResponseWriter,
    CollectedBody(body): CollectedBody<DeleteUserBody>,
) -> Result<Response, Response> {
    let username = body.user.unwrap_or_default();
    state
        .users
        .delete_user(&state.sessions, &username)
        .await
        .map_err(|e| writer.error(e))?;
    Ok(writer.send(StatusCode::NO_CONTENT, None, None))
}

// =============================================================================
// Images
// =============================================================================

/// Upload an image reference.
///
/// `POST /addImage {image, tags, uploader}`
///
/// The URL is probed before the record is stored; only `image/*` content is
/// accepted. Answers `201 {"message": "Created successfully"}`.
pub async fn add_image_handler<V: ImageUrlValidator>(
    State(state): State<AppState<V>>,
    writer: ResponseWriter,
    CollectedBody(body): CollectedBody<AddImageBody>,
) -> Result<Response, Response> {
    let url = body.image.unwrap_or_default();
    let tags = body.tags.unwrap_or_default();
    let uploader = body.uploader.unwrap_or_default();

    state
        .images
        .validate_image(state.validator.as_ref(), &url, &tags, &uploader)
        .await
        .map_err(|e| writer.error(e))?;

    Ok(writer.json(
        StatusCode::CREATED,
        &MessageResponse {
            message: "Created successfully",
        },
    ))
}

/// Images carrying every requested tag.
///
/// `GET /getImages?tags=cat~orange`. Without `tags` (or with an empty
/// value) every image is returned.
pub async fn images_handler<V: ImageUrlValidator>(
    State(state): State<AppState<V>>,
    writer: ResponseWriter,
    query: ParsedQuery,
) -> Response {
    let required = query
        .non_empty_param("tags")
        .map(split_tags)
        .unwrap_or_default();

    let images = state.images.match_images(&required).await;
    debug!(tags = ?required, matched = images.len(), "images matched");
    writer.json(StatusCode::OK, &images)
}

/// Images uploaded by one user.
///
/// `GET /getUploads?user=name`
pub async fn uploads_handler<V: ImageUrlValidator>(
    State(state): State<AppState<V>>,
    writer: ResponseWriter,
    query: ParsedQuery,
) -> Response {
    let Some(user) = query.non_empty_param("user") else {
        return writer.error(ApiError::MissingParams("Image or metadata missing"));
    };

    let images = state.images.match_uploads(user).await;
    writer.json(StatusCode::OK, &images)
}

/// Remove every record of an image URL.
///
/// `POST /deleteImage {url}` answers `204`.
pub async fn delete_image_handler<V: ImageUrlValidator>(
    State(state): State<AppState<V>>,
    writer: ResponseWriter,
    CollectedBody(body): CollectedBody<DeleteImageBody>,
) -> Result<Response, Response> {
    let url = body.url.unwrap_or_default();
    state
        .images
        .delete_image(&url)
        .await
        .map_err(|e| writer.error(e))?;
    Ok(writer.send(StatusCode::NO_CONTENT, None, None))
}

// =============================================================================
// Fallbacks
// =============================================================================

/// Any path without a route.
pub async fn not_found_handler(writer: ResponseWriter) -> Response {
    writer.error(ApiError::NotFound)
}

/// A known path called with a method it does not serve.
pub async fn method_not_allowed_handler(writer: ResponseWriter) -> Response {
    writer.error(ApiError::MethodNotAllowed)
}

// =============================================================================
// Tests
// =============================================================================
