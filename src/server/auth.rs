//! Session-based authorization for Tagboard.
//!
//! Every request passes through [`auth_middleware`] before it is dispatched.
//! The middleware resolves the `session` cookie against the session and user
//! stores, then applies the endpoint policy:
//!
//! ```text
//! path not in PROTECTED_ENDPOINTS              -> allow
//! live session && (!requires_admin || admin)   -> allow
//! otherwise                                    -> 403 {"id": "unauthorized"}
//! ```
//!
//! A session is live only if its token is recorded **and** the user it was
//! issued for still exists.
//!
//! The resolved session is attached to the request as a [`SessionContext`]
//! extension, which handlers extract directly.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::error::ApiError;
use crate::query::{parse_query, ParsedQuery};
use crate::store::{SessionStore, User, UserStore};
use crate::validator::ImageUrlValidator;

use super::handlers::AppState;
use super::response::ResponseWriter;

// =============================================================================
// Endpoint Policy
// =============================================================================

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// Endpoints that require a live session, and whether they also require admin.
///
/// Any path not listed here is public.
pub const PROTECTED_ENDPOINTS: &[(&str, bool)] = &[
    ("/addImage", false),
    ("/getSessionUser", false),
    ("/deleteImage", true),
    ("/deleteUser", true),
];

/// Look up a path in [`PROTECTED_ENDPOINTS`].
///
/// Returns `None` for public paths, otherwise whether admin is required.
pub fn endpoint_requires_admin(path: &str) -> Option<bool> {
    PROTECTED_ENDPOINTS
        .iter()
        .find(|(endpoint, _)| *endpoint == path)
        .map(|(_, requires_admin)| *requires_admin)
}

/// Decide whether a request for `path` may proceed.
///
/// `session` must already be known to be live (see [`validate_session`]).
pub fn authorize_request(path: &str, session: Option<&ActiveSession>) -> Result<(), ApiError> {
    let Some(requires_admin) = endpoint_requires_admin(path) else {
        return Ok(());
    };

    match session {
        Some(session) if !requires_admin || session.user.is_admin => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}

// =============================================================================
// Session Resolution
// =============================================================================

/// A session that resolved to an existing user for this request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    /// The session token presented by the client
    pub token: String,

    /// The user the session belongs to, as of this request
    pub user: User,
}

/// Extract every `session=` value from the `Cookie` header(s), in order.
///
/// Cookie pairs are separated by `"; "`.
pub fn session_cookies(headers: &HeaderMap) -> Vec<&str> {
    let prefix = format!("{}=", SESSION_COOKIE);
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split("; "))
        .filter_map(|pair| pair.strip_prefix(prefix.as_str()))
        .collect()
}

/// Resolve the request's session cookie to a live session.
///
/// The first `session=` cookie naming a recorded token whose user still
/// exists wins. Sessions of deleted users are ignored.
pub async fn validate_session(
    headers: &HeaderMap,
    sessions: &SessionStore,
    users: &UserStore,
) -> Option<ActiveSession> {
    for token in session_cookies(headers) {
        let Some(username) = sessions.username_for(token).await else {
            continue;
        };
        match users.get(&username).await {
            Some(user) => {
                return Some(ActiveSession {
                    token: token.to_string(),
                    user,
                })
            }
            None => debug!(username = %username, "ignoring dangling session"),
        }
    }

    None
}

// =============================================================================
// Axum Integration
// =============================================================================

/// The outcome of session resolution, attached to each request.
#[derive(Debug, Clone, Default)]
pub struct SessionContext(pub Option<ActiveSession>);

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Axum middleware enforcing the endpoint policy.
///
/// Parses the request target, resolves the session, and either rejects the
/// request with 403 or forwards it with [`ParsedQuery`] and
/// [`SessionContext`] extensions attached.
pub async fn auth_middleware<V>(
    State(state): State<AppState<V>>,
    mut request: Request,
    next: Next,
) -> Response
where
    V: ImageUrlValidator + 'static,
{
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let query = parse_query(target);

    let session = validate_session(request.headers(), &state.sessions, &state.users).await;

    if let Err(e) = authorize_request(&query.path, session.as_ref()) {
        debug!(
            path = %query.path,
            has_session = session.is_some(),
            "request denied by auth gate"
        );
        return ResponseWriter::for_method(request.method()).error(e);
    }

    request.extensions_mut().insert(query);
    request.extensions_mut().insert(SessionContext(session));
    next.run(request).await
}

impl<S> FromRequestParts<S> for ParsedQuery
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(query) = parts.extensions.get::<ParsedQuery>() {
            return Ok(query.clone());
        }
        let target = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        Ok(parse_query(target))
    }
}

// =============================================================================
// Tests
// =============================================================================
