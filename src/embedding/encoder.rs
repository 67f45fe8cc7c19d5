use crate::constants::HASHING_EMBEDDING_DIM;
use crate::hashing::hash_pair;

use super::error::EmbeddingError;

/// Synchronous text encoder. Implementations are CPU-bound and are driven from
/// `spawn_blocking` by [`EmbeddingProvider`](super::EmbeddingProvider).
pub trait TextEncoder: Send + Sync {
    /// Encodes already-normalized text into an L2-normalized vector.
    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Output dimension.
    fn dim(&self) -> usize;

    /// Short identifier for logs.
    fn name(&self) -> &str;
}

/// Model-free encoder: token feature hashing into a fixed number of buckets.
///
/// Vectors are non-negative, so cosine scores stay in `[0, 1]`, and texts sharing
/// words land close together. Used when no model directory is configured.
#[derive(Debug, Clone)]
pub struct HashingEncoder {
    dim: usize,
}

impl Default for HashingEncoder {
    fn default() -> Self {
        Self {
            dim: HASHING_EMBEDDING_DIM,
        }
    }
}

impl HashingEncoder {
    pub fn new(dim: usize) -> Result<Self, EmbeddingError> {
        if dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "hashing encoder dimension must be non-zero".to_string(),
            });
        }
        Ok(Self { dim })
    }

    fn bucket(&self, token: &str) -> usize {
        (hash_pair("tok", token) % self.dim as u64) as usize
    }
}

impl TextEncoder for HashingEncoder {
    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut embedding = vec![0.0f32; self.dim];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            embedding[self.bucket(&token.to_lowercase())] += 1.0;
        }

        l2_normalize(&mut embedding);
        Ok(embedding)
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

/// Scales `v` to unit length in place; zero vectors are left untouched.
pub(crate) fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
