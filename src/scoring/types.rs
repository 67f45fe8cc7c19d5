use serde::Serialize;

use crate::item::MatchMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
/// Which signal produced a text score.
pub enum TextSignal {
    /// Embedding cosine similarity.
    Semantic,
    /// Synonym/character similarity (embeddings unavailable).
    Lexical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// Item-pair text score.
pub struct TextComparison {
    /// Score in `0..=100`.
    pub score: u8,
    pub signal: TextSignal,
}

impl TextComparison {
    /// Score as a `[0, 1]` similarity.
    pub fn similarity(&self) -> f32 {
        f32::from(self.score) / 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// Result of comparing two items, optionally with their images.
pub struct ItemComparison {
    /// Score in `0..=100`.
    pub score: u8,
    pub method: MatchMethod,
}

impl ItemComparison {
    pub fn similarity(&self) -> f32 {
        f32::from(self.score) / 100.0
    }
}
