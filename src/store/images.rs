//! Uploaded image records.
//!
//! Images are kept in upload order. The same URL may be uploaded any number
//! of times; each upload is its own record.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::validator::{check_image_url, ImageUrlValidator, UrlVerdict};

/// A tagged reference to a remote image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Remote location of the image
    pub url: String,

    /// Tags in the order they were supplied (duplicates allowed)
    pub tags: Vec<String>,

    /// Name of the uploading user
    pub uploader: String,
}

impl Image {
    pub fn new(url: impl Into<String>, tags: Vec<String>, uploader: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            tags,
            uploader: uploader.into(),
        }
    }

    /// Whether every tag in `required` appears in this image's tags.
    pub fn has_all_tags(&self, required: &[String]) -> bool {
        required.iter().all(|tag| self.tags.contains(tag))
    }
}

/// Images a fresh server starts with when seeding is enabled.
pub fn sample_images() -> Vec<Image> {
    vec![
        Image::new(
            "https://api.time.com/wp-content/uploads/2019/11/fish-with-human-face-tik-tok-video.jpg",
            vec!["test".to_string(), "fish".to_string()],
            "admin",
        ),
        Image::new(
            "https://www.rd.com/wp-content/uploads/2018/01/01_Common-Myths-About-Airplanes-You-Need-to-Stop-Believing_559714906_motive56-760x506.jpg",
            vec!["test".to_string(), "airplane".to_string()],
            "admin",
        ),
    ]
}

/// In-memory image table.
#[derive(Debug, Default)]
pub struct ImageStore {
    images: RwLock<Vec<Image>>,
}

impl ImageStore {
    /// Create an empty image store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `images`.
    pub fn with_images(images: Vec<Image>) -> Self {
        Self {
            images: RwLock::new(images),
        }
    }

    /// Append an image record. Duplicate URLs are kept.
    pub async fn add_image(&self, image: Image) {
        info!(url = %image.url, uploader = %image.uploader, "image added");
        self.images.write().await.push(image);
    }

    /// Validate an upload and store it on success.
    ///
    /// All fields must be present (and `tags` non-empty) before the URL is
    /// probed. The store is not locked while the probe is in flight.
    pub async fn validate_image<V>(
        &self,
        validator: &V,
        url: &str,
        tags: &[String],
        uploader: &str,
    ) -> Result<(), ApiError>
    where
        V: ImageUrlValidator + ?Sized,
    {
        if url.is_empty() || tags.is_empty() || uploader.is_empty() {
            return Err(ApiError::MissingParams("Image or metadata missing"));
        }

        match check_image_url(validator, url).await {
            UrlVerdict::Image => {
                self.add_image(Image::new(url, tags.to_vec(), uploader))
                    .await;
                Ok(())
            }
            verdict => {
                debug!(url = url, verdict = ?verdict, "image upload rejected");
                Err(ApiError::InvalidParams("Invalid image URL"))
            }
        }
    }

    /// All images carrying every tag in `required`.
    ///
    /// An empty `required` matches every image.
    pub async fn match_images(&self, required: &[String]) -> Vec<Image> {
        self.images
            .read()
            .await
            .iter()
            .filter(|image| image.has_all_tags(required))
            .cloned()
            .collect()
    }

    /// All images uploaded by `username`.
    pub async fn match_uploads(&self, username: &str) -> Vec<Image> {
        self.images
            .read()
            .await
            .iter()
            .filter(|image| image.uploader == username)
            .cloned()
            .collect()
    }

    /// Remove every image whose URL is exactly `url`.
    ///
    /// Returns the number of records removed.
    pub async fn delete_image(&self, url: &str) -> Result<usize, ApiError> {
        if url.is_empty() {
            return Err(ApiError::MissingParams("Image URL missing"));
        }

        let mut images = self.images.write().await;
        let before = images.len();
        images.retain(|image| image.url != url);
        let removed = before - images.len();

        if removed == 0 {
            return Err(ApiError::InvalidParams("Invalid image URL"));
        }

        info!(url = url, removed = removed, "image deleted");
        Ok(removed)
    }

    /// Snapshot of every stored image, in upload order.
    pub async fn all(&self) -> Vec<Image> {
        self.images.read().await.clone()
    }

    /// Number of stored images.
    pub async fn len(&self) -> usize {
        self.images.read().await.len()
    }

    /// Whether the store holds no images.
    pub async fn is_empty(&self) -> bool {
        self.images.read().await.is_empty()
    }
}
