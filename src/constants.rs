//! Cross-cutting, shared constants.
//!
//! Thresholds are expressed in `[0, 1]` unless the name ends in `_PERCENT`.
//! The text/image weights are fixed; the semantic/lexical weights are only
//! defaults and can be overridden through [`crate::config::EngineConfig`].

/// Minimum text similarity for a candidate to become a match.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.70;

/// Minimum combined similarity for an ownership answer to be accepted.
pub const DEFAULT_VERIFY_THRESHOLD: f32 = 0.75;

/// Read-side display filter (`similarity_percent > DEFAULT_DISPLAY_THRESHOLD_PERCENT`).
pub const DEFAULT_DISPLAY_THRESHOLD_PERCENT: u8 = 70;

/// Default weight of the embedding signal in verification scoring.
pub const DEFAULT_SEMANTIC_WEIGHT: f32 = 0.75;

/// Default weight of the lexical signal in verification scoring.
pub const DEFAULT_LEXICAL_WEIGHT: f32 = 0.25;

/// Weight of the text score when both items carry images.
pub const TEXT_WEIGHT_WITH_IMAGE: f32 = 0.4;

/// Weight of the image score when both items carry images.
pub const IMAGE_WEIGHT_WITH_IMAGE: f32 = 0.6;

/// Output dimension of the model-free hashing encoder.
pub const HASHING_EMBEDDING_DIM: usize = 384;

/// Max tokens fed to the BERT encoder.
pub const DEFAULT_MAX_SEQ_LEN: usize = 256;

/// Max synonyms kept per token.
pub const MAX_SYNONYMS_PER_TOKEN: usize = 20;

/// Converts a `[0, 1]` similarity to the persisted percentage.
///
/// Inputs outside the range are clamped first, so the result is always in `0..=100`.
#[inline]
pub fn to_percent(similarity: f32) -> u8 {
    (similarity.clamp(0.0, 1.0) * 100.0).round() as u8
}
