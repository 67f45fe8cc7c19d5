//! Zero-shot image labelers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::hashing::hash_pair;

use super::error::ImageError;

#[async_trait]
/// Scores one image against a fixed label set.
pub trait ImageLabeler: Send + Sync {
    /// Returns one non-negative score per label, in label order.
    async fn label_scores(&self, image_url: &str, labels: &[&str]) -> Result<Vec<f32>, ImageError>;

    /// Short identifier for logs.
    fn name(&self) -> &'static str;
}

#[derive(Debug, Serialize)]
struct LabelRequest<'a> {
    image_url: &'a str,
    labels: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct LabelResponse {
    scores: Vec<f32>,
}

/// Local zero-shot inference endpoint (`POST {image_url, labels}` → `{scores}`).
pub struct HttpImageLabeler {
    endpoint: String,
    http: HttpClient,
}

impl HttpImageLabeler {
    /// Fails when the HTTP client cannot be built with `timeout`.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ImageError> {
        Ok(Self {
            endpoint: endpoint.to_string(),
            http: HttpClient::builder().timeout(timeout).build()?,
        })
    }
}

#[async_trait]
impl ImageLabeler for HttpImageLabeler {
    async fn label_scores(&self, image_url: &str, labels: &[&str]) -> Result<Vec<f32>, ImageError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&LabelRequest { image_url, labels })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Status {
                status: status.as_u16(),
            });
        }

        let body: LabelResponse = response.json().await?;
        if body.scores.len() != labels.len() {
            return Err(ImageError::InvalidResponse {
                reason: format!(
                    "expected {} scores, got {}",
                    labels.len(),
                    body.scores.len()
                ),
            });
        }
        debug!(image_url, labels = labels.len(), "Labeled image");
        Ok(body.scores)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Deterministic scores derived from the URL; same URL, same vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubImageLabeler;

#[async_trait]
impl ImageLabeler for StubImageLabeler {
    async fn label_scores(&self, image_url: &str, labels: &[&str]) -> Result<Vec<f32>, ImageError> {
        Ok(labels
            .iter()
            .map(|label| (hash_pair(image_url.trim(), label) % 10_000) as f32 / 10_000.0)
            .collect())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}
