//! Request body collection for POST endpoints.
//!
//! [`CollectedBody`] drains the request body frame by frame into one buffer,
//! then parses it as JSON. Failures never reach the handler:
//!
//! - a transport error while streaming answers `400` with an empty body
//! - a body that is not valid JSON (or has the wrong shape) answers `400`
//!   with `{"id": "malformedBody"}`

use axum::{
    body::Body,
    extract::{FromRequest, Request},
    response::Response,
};
use bytes::{Bytes, BytesMut};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;

use super::response::ResponseWriter;

/// Extractor yielding the request body parsed as `T`.
#[derive(Debug, Clone)]
pub struct CollectedBody<T>(pub T);

impl<S, T> FromRequest<S> for CollectedBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Response;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let writer = ResponseWriter::for_method(req.method());

        let bytes = collect_body(req.into_body())
            .await
            .map_err(|e| writer.error(e))?;
        let value = parse_body(&bytes).map_err(|e| writer.error(e))?;

        Ok(CollectedBody(value))
    }
}

/// Accumulate every data frame of `body`, in order.
pub async fn collect_body(mut body: Body) -> Result<Bytes, ApiError> {
    let mut buf = BytesMut::new();

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(|e| {
            debug!("request body stream failed: {}", e);
            ApiError::BodyStream {
                reason: e.to_string(),
            }
        })?;
        if let Ok(chunk) = frame.into_data() {
            buf.extend_from_slice(&chunk);
        }
    }

    Ok(buf.freeze())
}

/// Parse a collected body as JSON.
pub fn parse_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|e| ApiError::MalformedBody {
        reason: e.to_string(),
    })
}
