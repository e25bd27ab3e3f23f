//! Image URL validation.
//!
//! Uploads reference remote images by URL. Before an upload is accepted the
//! URL is probed and the `Content-Type` the remote server reports is
//! inspected; only `image/*` responses are accepted.
//!
//! The probe is abstracted behind [`ImageUrlValidator`] so the server can run
//! against real HTTP ([`HttpHeadValidator`]), accept everything in local
//! development ([`PermissiveValidator`]), or use a canned table in tests.

mod head;

pub use head::{HttpHeadValidator, DEFAULT_VALIDATOR_TIMEOUT};

use async_trait::async_trait;
use tracing::debug;

use crate::error::ValidatorError;

/// Content type prefix an image URL must report to be accepted.
pub const IMAGE_CONTENT_TYPE_PREFIX: &str = "image/";

// =============================================================================
// ImageUrlValidator Trait
// =============================================================================

/// Probes a remote URL and reports its content type.
#[async_trait]
pub trait ImageUrlValidator: Send + Sync {
    /// Probe `url` and return the content type the remote end reported.
    ///
    /// `Ok(None)` means the URL answered but sent no usable content type.
    async fn probe(&self, url: &str) -> Result<Option<String>, ValidatorError>;
}

/// Result of checking an image URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlVerdict {
    /// The URL reported an `image/*` content type
    Image,

    /// The URL answered with some other (or no) content type
    NotImage { content_type: Option<String> },

    /// The URL could not be probed
    Unreachable { reason: String },
}

impl UrlVerdict {
    /// Whether the upload may proceed.
    pub fn is_image(&self) -> bool {
        matches!(self, UrlVerdict::Image)
    }
}

/// Check whether a content type names an image (case-sensitive prefix match).
pub fn is_image_content_type(content_type: &str) -> bool {
    content_type.starts_with(IMAGE_CONTENT_TYPE_PREFIX)
}

/// Probe `url` with `validator` and classify the outcome.
pub async fn check_image_url<V>(validator: &V, url: &str) -> UrlVerdict
where
    V: ImageUrlValidator + ?Sized,
{
    let verdict = match validator.probe(url).await {
        Ok(Some(content_type)) if is_image_content_type(&content_type) => UrlVerdict::Image,
        Ok(content_type) => UrlVerdict::NotImage { content_type },
        Err(e) => UrlVerdict::Unreachable {
            reason: e.to_string(),
        },
    };

    debug!(url = url, verdict = ?verdict, "image url checked");
    verdict
}

// =============================================================================
// Permissive Validator
// =============================================================================

/// Validator that reports every URL as an image without any network I/O.
///
/// Intended for offline development only.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveValidator;

#[async_trait]
impl ImageUrlValidator for PermissiveValidator {
    async fn probe(&self, _url: &str) -> Result<Option<String>, ValidatorError> {
        Ok(Some(format!("{}*", IMAGE_CONTENT_TYPE_PREFIX)))
    }
}
