//! Response construction.
//!
//! [`ResponseWriter`] is the single place responses are assembled. It knows
//! the method of the request it answers so that bodies are never written for
//! `HEAD` requests.

use std::convert::Infallible;

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue, Method, StatusCode},
    response::Response,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::error;

use crate::error::ApiError;

use super::handlers::render_error;

/// JSON content type used for API responses.
pub const APPLICATION_JSON: &str = "application/json";

/// Builds responses for one request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseWriter {
    head: bool,
}

impl ResponseWriter {
    /// Create a writer for a request made with `method`.
    pub fn for_method(method: &Method) -> Self {
        Self {
            head: method == Method::HEAD,
        }
    }

    /// Emit a response.
    ///
    /// The content type header and body are only written when both are given,
    /// and never for `HEAD` requests.
    pub fn send(
        &self,
        status: StatusCode,
        content_type: Option<&'static str>,
        body: Option<Bytes>,
    ) -> Response {
        let mut response = match (self.head, content_type, body) {
            (false, Some(content_type), Some(body)) => {
                let mut response = Response::new(Body::from(body));
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
                response
            }
            _ => Response::new(Body::empty()),
        };
        *response.status_mut() = status;
        response
    }

    /// Emit a JSON response.
    pub fn json<T: Serialize>(&self, status: StatusCode, value: &T) -> Response {
        match serde_json::to_vec(value) {
            Ok(body) => self.send(status, Some(APPLICATION_JSON), Some(Bytes::from(body))),
            Err(e) => {
                error!("Failed to serialize response body: {}", e);
                self.send(StatusCode::INTERNAL_SERVER_ERROR, None, None)
            }
        }
    }

    /// Emit the response for an API error.
    pub fn error(&self, err: ApiError) -> Response {
        let (status, body) = render_error(&err);
        match body {
            Some(body) => self.json(status, &body),
            None => self.send(status, None, None),
        }
    }
}

impl<S> FromRequestParts<S> for ResponseWriter
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ResponseWriter::for_method(&parts.method))
    }
}
