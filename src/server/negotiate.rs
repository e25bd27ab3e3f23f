//! `Accept` header pre-check.
//!
//! The server only produces JSON, HTML, and CSS. A request whose `Accept`
//! header lists none of these (directly or via a wildcard) is rejected with
//! `400 {"id": "invalidParams"}` before dispatch. Requests without an
//! `Accept` header are always allowed. A range weighted `q=0` is refused by
//! the client and never counts as a match.

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::error::ApiError;

use super::response::ResponseWriter;

/// Media types the server can produce.
pub const SUPPORTED_MEDIA_TYPES: &[&str] = &["application/json", "text/html", "text/css"];

/// Whether the parameters of a media range carry a zero quality value.
///
/// Unparseable weights are treated as acceptable.
fn is_refused<'a>(mut params: impl Iterator<Item = &'a str>) -> bool {
    params.any(|param| {
        let Some((key, value)) = param.split_once('=') else {
            return false;
        };
        key.trim().eq_ignore_ascii_case("q")
            && value
                .trim()
                .parse::<f32>()
                .map(|q| q <= 0.0)
                .unwrap_or(false)
    })
}

/// Whether a single media range covers one of [`SUPPORTED_MEDIA_TYPES`].
fn range_is_supported(range: &str) -> bool {
    let mut parts = range.split(';');
    let media = parts.next().unwrap_or("").trim().to_ascii_lowercase();
    if is_refused(parts) {
        return false;
    }

    match media.as_str() {
        "*/*" => true,
        _ => match media.strip_suffix("/*") {
            Some(kind) => SUPPORTED_MEDIA_TYPES
                .iter()
                .any(|supported| supported.split('/').next() == Some(kind)),
            None => SUPPORTED_MEDIA_TYPES.contains(&media.as_str()),
        },
    }
}

/// Whether the request's `Accept` header(s) allow any supported type.
///
/// Missing, empty, or non-UTF-8 headers accept everything.
pub fn accepts_supported_type(headers: &HeaderMap) -> bool {
    let ranges: Vec<&str> = headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter(|range| !range.trim().is_empty())
        .collect();

    ranges.is_empty() || ranges.iter().any(|range| range_is_supported(range))
}

/// Axum middleware rejecting requests that accept nothing we serve.
pub async fn accept_middleware(request: Request, next: Next) -> Response {
    if !accepts_supported_type(request.headers()) {
        debug!(path = %request.uri().path(), "rejecting unsatisfiable Accept header");
        return ResponseWriter::for_method(request.method())
            .error(ApiError::InvalidParams("Invalid content request"));
    }

    next.run(request).await
}
