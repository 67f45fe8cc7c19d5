//! Ownership-answer verification.
//!
//! The lexical score is always computed. The semantic score is attempted and
//! blended in when available; otherwise the lexical score decides alone. The
//! verifier never touches the item store.


use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::{EngineError, EngineResult};
use crate::scoring::Combiner;

/// Verdict on one answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    pub is_verified: bool,
    /// Combined score in `[0, 1]`.
    pub similarity: f32,
    /// `None` when embeddings were unavailable.
    pub semantic_sim: Option<f32>,
    pub lexical_sim: f32,
    pub threshold: f32,
}

#[derive(Debug)]
pub struct AnswerVerifier {
    combiner: Arc<Combiner>,
}

impl AnswerVerifier {
    pub fn new(combiner: Arc<Combiner>) -> Self {
        Self { combiner }
    }

    /// Scores `provided` against `correct`; verified when the blend reaches `threshold`.
    ///
    /// Only empty input is an error. Provider failures degrade to lexical scoring.
    #[instrument(skip_all, fields(threshold))]
    pub async fn verify(
        &self,
        provided: &str,
        correct: &str,
        threshold: f32,
    ) -> EngineResult<Verification> {
        if provided.trim().is_empty() {
            return Err(EngineError::input("answer is empty"));
        }
        if correct.trim().is_empty() {
            return Err(EngineError::input("no stored answer to verify against"));
        }

        let (semantic_sim, lexical_sim) = tokio::join!(
            self.combiner.semantic_similarity(provided, correct),
            self.combiner.lexical().similarity(provided, correct),
        );
        let semantic_sim = semantic_sim?;
        let similarity = self.combiner.blend(semantic_sim, lexical_sim);

        debug!(
            ?semantic_sim,
            lexical_sim, similarity, threshold, "Scored verification answer"
        );

        Ok(Verification {
            is_verified: similarity >= threshold,
            similarity,
            semantic_sim,
            lexical_sim,
            threshold,
        })
    }
}
