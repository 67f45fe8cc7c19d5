//! Coarse visual similarity from zero-shot label scores.
//!
//! Each image is scored against [`IMAGE_LABELS`], the score vector is
//! L2-normalized, and the two vectors are cosine-compared. A result of `0`
//! means "unavailable" and callers fall back to text-only scoring.

mod error;
pub mod labeler;


pub use error::ImageError;
pub use labeler::{HttpImageLabeler, ImageLabeler, StubImageLabeler};

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::constants::to_percent;
use crate::embedding::cosine_similarity;

/// Label set for zero-shot scoring.
pub const IMAGE_LABELS: &[&str] = &[
    "wallet",
    "phone",
    "keys",
    "bag",
    "backpack",
    "laptop",
    "headphones",
    "water bottle",
    "umbrella",
    "jacket",
    "glasses",
    "watch",
    "id card",
    "book",
    "charger",
    "jewelry",
];

pub struct ImageSimilarity {
    labeler: Arc<dyn ImageLabeler>,
    timeout: Duration,
}

impl std::fmt::Debug for ImageSimilarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSimilarity")
            .field("labeler", &self.labeler.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ImageSimilarity {
    pub fn new(labeler: Arc<dyn ImageLabeler>, timeout: Duration) -> Self {
        Self { labeler, timeout }
    }

    /// `None` when no image endpoint is configured or its client cannot be built.
    pub fn from_config(config: &EngineConfig) -> Option<Self> {
        let endpoint = config.image_endpoint.as_deref()?;
        match HttpImageLabeler::new(endpoint, config.provider_timeout) {
            Ok(labeler) => Some(Self::new(Arc::new(labeler), config.provider_timeout)),
            Err(e) => {
                warn!(error = %e, "Image labeler client unavailable, scoring text only");
                None
            }
        }
    }

    /// Similarity in `[0, 100]`; `0` when either URL is missing or inference fails.
    pub async fn compare(&self, url_a: Option<&str>, url_b: Option<&str>) -> u8 {
        let (Some(url_a), Some(url_b)) = (non_blank(url_a), non_blank(url_b)) else {
            return 0;
        };

        let (a, b) = tokio::join!(self.label_vector(url_a), self.label_vector(url_b));
        let (a, b) = match (a, b) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, labeler = self.labeler.name(), "Image similarity unavailable");
                return 0;
            }
        };

        let percent = to_percent(cosine_similarity(&a, &b));
        debug!(url_a, url_b, percent, "Image similarity");
        percent
    }

    async fn label_vector(&self, url: &str) -> Result<Vec<f32>, ImageError> {
        let scores = tokio::time::timeout(
            self.timeout,
            self.labeler.label_scores(url, IMAGE_LABELS),
        )
        .await
        .map_err(|_| ImageError::Timeout {
            after_ms: self.timeout.as_millis(),
        })??;

        if scores.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(ImageError::InvalidResponse {
                reason: "scores must be finite and non-negative".to_string(),
            });
        }

        let norm = scores.iter().map(|s| s * s).sum::<f32>().sqrt();
        if norm == 0.0 {
            return Err(ImageError::InvalidResponse {
                reason: "all label scores are zero".to_string(),
            });
        }
        Ok(scores.into_iter().map(|s| s / norm).collect())
    }
}

fn non_blank(url: Option<&str>) -> Option<&str> {
    url.map(str::trim).filter(|u| !u.is_empty())
}
