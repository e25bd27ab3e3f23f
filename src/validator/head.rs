//! HTTP HEAD based image URL validator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::error::ValidatorError;

use super::ImageUrlValidator;

/// Default timeout for a single probe.
pub const DEFAULT_VALIDATOR_TIMEOUT: Duration = Duration::from_secs(5);

/// Validator that issues a `HEAD` request and reads `Content-Type`.
///
/// Header names are matched case-insensitively by the HTTP stack, so servers
/// answering with `content-type` or `Content-Type` are treated the same.
/// Only `http` and `https` URLs are probed.
#[derive(Clone)]
pub struct HttpHeadValidator {
    http: Client,
}

impl HttpHeadValidator {
    /// Create a validator whose probes give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, ValidatorError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ValidatorError::Client(e.to_string()))?;

        Ok(Self { http })
    }
}

/// Parse `raw` and reject anything that is not an http(s) URL.
fn parse_probe_url(raw: &str) -> Result<Url, ValidatorError> {
    let url = Url::parse(raw).map_err(|_| ValidatorError::UnsupportedUrl(raw.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ValidatorError::UnsupportedUrl(raw.to_string())),
    }
}

#[async_trait]
impl ImageUrlValidator for HttpHeadValidator {
    #[instrument(skip(self), level = "debug")]
    async fn probe(&self, url: &str) -> Result<Option<String>, ValidatorError> {
        let url = parse_probe_url(url)?;

        let resp = self
            .http
            .head(url)
            .send()
            .await
            .map_err(|e| ValidatorError::Connection(e.to_string()))?;

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        debug!(
            status = resp.status().as_u16(),
            content_type = ?content_type,
            "image url probed"
        );

        Ok(content_type)
    }
}
