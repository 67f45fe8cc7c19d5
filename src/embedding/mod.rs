//! Text embedding: encoders, the shared cache and the lazily-initialized provider.
//!
//! - [`provider`] owns single-flight encoder initialization and the timeout contract.
//! - [`cache`] is the injected, size/TTL-bound cache keyed by normalized text.
//! - [`bert`] is the candle-backed sentence encoder; [`encoder`] holds the trait and
//!   the model-free hashing encoder.

/// candle BERT sentence encoder.
pub mod bert;
/// Embedding cache.
pub mod cache;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
/// Encoder trait and hashing encoder.
pub mod encoder;
/// Cached, single-flight embedding provider.
pub mod provider;
mod similarity;

#[cfg(test)]
mod tests;

pub use bert::BertEncoder;
pub use cache::{CacheStats, Embedding, EmbeddingCache};
pub use encoder::{HashingEncoder, TextEncoder};
pub use error::EmbeddingError;
pub use provider::EmbeddingProvider;
pub use similarity::cosine_similarity;
