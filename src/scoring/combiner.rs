use std::sync::Arc;

use tracing::{debug, instrument};

use crate::config::EngineConfig;
use crate::constants::{
    DEFAULT_LEXICAL_WEIGHT, DEFAULT_SEMANTIC_WEIGHT, IMAGE_WEIGHT_WITH_IMAGE,
    TEXT_WEIGHT_WITH_IMAGE, to_percent,
};
use crate::embedding::{EmbeddingError, EmbeddingProvider, cosine_similarity};
use crate::error::{EngineError, EngineResult};
use crate::image::ImageSimilarity;
use crate::item::{Item, MatchMethod};
use crate::lexical::LexicalScorer;

use super::types::{ItemComparison, TextComparison, TextSignal};

pub struct Combiner {
    embeddings: Arc<EmbeddingProvider>,
    lexical: Arc<LexicalScorer>,
    images: Option<Arc<ImageSimilarity>>,
    semantic_weight: f32,
    lexical_weight: f32,
}

impl std::fmt::Debug for Combiner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Combiner")
            .field("images", &self.images.is_some())
            .field("semantic_weight", &self.semantic_weight)
            .field("lexical_weight", &self.lexical_weight)
            .finish()
    }
}

impl Combiner {
    /// Combiner with the default 0.75 / 0.25 verification weights and no image signal.
    pub fn new(embeddings: Arc<EmbeddingProvider>, lexical: Arc<LexicalScorer>) -> Self {
        Self {
            embeddings,
            lexical,
            images: None,
            semantic_weight: DEFAULT_SEMANTIC_WEIGHT,
            lexical_weight: DEFAULT_LEXICAL_WEIGHT,
        }
    }

    pub fn from_config(
        config: &EngineConfig,
        embeddings: Arc<EmbeddingProvider>,
        lexical: Arc<LexicalScorer>,
        images: Option<Arc<ImageSimilarity>>,
    ) -> Self {
        let (semantic, lexical_weight) = config.normalized_weights();
        let mut combiner = Self::new(embeddings, lexical).with_weights(semantic, lexical_weight);
        combiner.images = images;
        combiner
    }

    pub fn with_images(mut self, images: Arc<ImageSimilarity>) -> Self {
        self.images = Some(images);
        self
    }

    /// Sets verification weights, re-normalized to sum to 1.
    ///
    /// Negative, non-finite or all-zero pairs keep the defaults.
    pub fn with_weights(mut self, semantic: f32, lexical: f32) -> Self {
        let sum = semantic + lexical;
        if sum.is_finite() && sum > 0.0 && semantic >= 0.0 && lexical >= 0.0 {
            self.semantic_weight = semantic / sum;
            self.lexical_weight = lexical / sum;
        }
        self
    }

    pub fn weights(&self) -> (f32, f32) {
        (self.semantic_weight, self.lexical_weight)
    }

    pub fn lexical(&self) -> &LexicalScorer {
        &self.lexical
    }

    /// Cosine similarity of the two embeddings, `None` when embeddings are unavailable.
    pub async fn semantic_similarity(&self, a: &str, b: &str) -> EngineResult<Option<f32>> {
        let (ea, eb) = tokio::join!(self.embeddings.embed(a), self.embeddings.embed(b));
        match (ea.map_err(embedding_input)?, eb.map_err(embedding_input)?) {
            (Some(ea), Some(eb)) => Ok(Some(cosine_similarity(&ea, &eb))),
            _ => {
                let degraded = EngineError::ProviderUnavailable {
                    provider: "embedding",
                    reason: "no vector produced, falling back to lexical".to_string(),
                };
                debug!(error = %degraded, "Semantic signal unavailable");
                Ok(None)
            }
        }
    }

    /// Text score in `0..=100`: embedding cosine, or lexical similarity when
    /// embeddings are unavailable.
    #[instrument(skip_all)]
    pub async fn compare_texts(&self, a: &str, b: &str) -> EngineResult<TextComparison> {
        if a.trim().is_empty() || b.trim().is_empty() {
            return Err(EngineError::input("cannot compare empty text"));
        }

        let comparison = match self.semantic_similarity(a, b).await? {
            Some(similarity) => TextComparison {
                score: to_percent(similarity),
                signal: TextSignal::Semantic,
            },
            None => TextComparison {
                score: to_percent(self.lexical.similarity(a, b).await),
                signal: TextSignal::Lexical,
            },
        };

        debug!(score = comparison.score, signal = ?comparison.signal, "Compared texts");
        Ok(comparison)
    }

    /// Name+description score, blended 40/60 with the image score when both
    /// items carry an image and the image signal is available.
    #[instrument(skip_all, fields(a = %a.id(), b = %b.id()))]
    pub async fn compare_items(&self, a: &Item, b: &Item) -> EngineResult<ItemComparison> {
        let text = self.compare_texts(&a.match_text(), &b.match_text()).await?;
        let text_only = ItemComparison {
            score: text.score,
            method: MatchMethod::TextOnly,
        };

        let (Some(images), Some(url_a), Some(url_b)) = (&self.images, a.image_url(), b.image_url())
        else {
            return Ok(text_only);
        };

        let image = images.compare(Some(url_a), Some(url_b)).await;
        if image == 0 {
            let degraded = EngineError::ProviderUnavailable {
                provider: "image",
                reason: "zero score".to_string(),
            };
            debug!(error = %degraded, "Scoring text only");
            return Ok(text_only);
        }

        let blended = TEXT_WEIGHT_WITH_IMAGE * f32::from(text.score)
            + IMAGE_WEIGHT_WITH_IMAGE * f32::from(image);
        Ok(ItemComparison {
            score: blended.round().clamp(0.0, 100.0) as u8,
            method: MatchMethod::TextImage,
        })
    }

    /// Verification blend; `semantic = None` returns `lexical` unchanged.
    pub fn blend(&self, semantic: Option<f32>, lexical: f32) -> f32 {
        match semantic {
            Some(semantic) => {
                (self.semantic_weight * semantic + self.lexical_weight * lexical).clamp(0.0, 1.0)
            }
            None => lexical,
        }
    }
}

fn embedding_input(e: EmbeddingError) -> EngineError {
    EngineError::input(e.to_string())
}
