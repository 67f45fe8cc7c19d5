//! Synonym-aware lexical similarity.
//!
//! Both texts are tokenized (lower-case, alphanumeric runs). A token on one side
//! matches when its synonym set meets the union of the other side's synonym sets.
//! The score is a Dice-style coefficient over matched tokens, counted from both
//! sides so `similarity(a, b) == similarity(b, a)`.
//!
//! When synonyms are unavailable, when either side has no tokens, or when the
//! synonym score is exactly zero, the score falls back to [`char_similarity`].

mod error;
pub mod synonyms;

#[cfg(test)]
mod tests;

pub use error::SynonymError;
pub use synonyms::{
    DatamuseSynonyms, NoSynonyms, StaticSynonyms, SynonymCache, SynonymSet, SynonymSource,
};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::config::{EngineConfig, SynonymBackend};

/// Splits lower-cased text into alphanumeric tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Sørensen–Dice coefficient over character bigrams, whitespace ignored.
///
/// Identical strings score 1; strings shorter than two characters only match exactly.
pub fn char_similarity(a: &str, b: &str) -> f32 {
    let a: Vec<char> = a.chars().filter(|c| !c.is_whitespace()).collect();
    let b: Vec<char> = b.chars().filter(|c| !c.is_whitespace()).collect();

    if a == b {
        return if a.is_empty() { 0.0 } else { 1.0 };
    }
    if a.len() < 2 || b.len() < 2 {
        return 0.0;
    }

    let mut bigrams: HashMap<(char, char), usize> = HashMap::new();
    for pair in a.windows(2) {
        *bigrams.entry((pair[0], pair[1])).or_insert(0) += 1;
    }

    let mut shared = 0usize;
    for pair in b.windows(2) {
        if let Some(count) = bigrams.get_mut(&(pair[0], pair[1]))
            && *count > 0
        {
            *count -= 1;
            shared += 1;
        }
    }

    (2 * shared) as f32 / ((a.len() - 1) + (b.len() - 1)) as f32
}

/// Lexical scorer with an injected synonym source and cache.
pub struct LexicalScorer {
    source: Arc<dyn SynonymSource>,
    cache: SynonymCache,
    enabled: bool,
    timeout: Duration,
}

impl std::fmt::Debug for LexicalScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LexicalScorer")
            .field("source", &self.source.name())
            .field("enabled", &self.enabled)
            .field("cache", &self.cache)
            .finish()
    }
}

impl LexicalScorer {
    pub fn new(source: Arc<dyn SynonymSource>, cache: SynonymCache, timeout: Duration) -> Self {
        Self {
            source,
            cache,
            enabled: true,
            timeout,
        }
    }

    /// Builds the scorer the config selects.
    pub fn from_config(config: &EngineConfig) -> Self {
        let cache = SynonymCache::new(config.synonym_cache_capacity, config.synonym_cache_ttl);
        let source: Arc<dyn SynonymSource> = match config.synonym_backend {
            SynonymBackend::Datamuse => {
                match DatamuseSynonyms::new(&config.synonym_endpoint, config.provider_timeout) {
                    Ok(source) => Arc::new(source),
                    Err(e) => {
                        warn!(error = %e, "Synonym client unavailable, using character similarity");
                        Arc::new(NoSynonyms)
                    }
                }
            }
            SynonymBackend::Builtin => Arc::new(StaticSynonyms::builtin()),
        };
        let mut scorer = Self::new(source, cache, config.provider_timeout);
        scorer.enabled = config.synonyms_enabled;
        scorer
    }

    /// Scorer that never looks up synonyms (pure character similarity).
    pub fn disabled() -> Self {
        Self {
            source: Arc::new(NoSynonyms),
            cache: SynonymCache::new(1, Duration::from_secs(1)),
            enabled: false,
            timeout: Duration::from_secs(1),
        }
    }

    /// Scorer backed by the builtin offline table.
    pub fn builtin() -> Self {
        Self::new(
            Arc::new(StaticSynonyms::builtin()),
            SynonymCache::new(10_000, Duration::from_secs(24 * 60 * 60)),
            Duration::from_secs(5),
        )
    }

    pub fn cache(&self) -> &SynonymCache {
        &self.cache
    }

    /// Lexical similarity in `[0, 1]`. Never fails.
    pub async fn similarity(&self, a: &str, b: &str) -> f32 {
        let lower_a = a.to_lowercase();
        let lower_b = b.to_lowercase();
        let tokens_a = tokenize(a);
        let tokens_b = tokenize(b);

        if !self.enabled || tokens_a.is_empty() || tokens_b.is_empty() {
            return char_similarity(&lower_a, &lower_b);
        }

        let synonyms = match self.expand(tokens_a.iter().chain(tokens_b.iter())).await {
            Ok(synonyms) => synonyms,
            Err(e) => {
                warn!(error = %e, source = self.source.name(), "Synonyms unavailable, using character similarity");
                return char_similarity(&lower_a, &lower_b);
            }
        };

        let matched_a = count_matched(&tokens_a, &tokens_b, &synonyms);
        let matched_b = count_matched(&tokens_b, &tokens_a, &synonyms);
        let score = (matched_a + matched_b) as f32 / (tokens_a.len() + tokens_b.len()) as f32;

        debug!(
            tokens_a = tokens_a.len(),
            tokens_b = tokens_b.len(),
            matched_a,
            matched_b,
            score,
            "Synonym similarity"
        );

        if score == 0.0 {
            return char_similarity(&lower_a, &lower_b);
        }
        score.clamp(0.0, 1.0)
    }

    /// Expands every distinct token; one failed lookup fails the whole expansion.
    async fn expand<'a>(
        &self,
        tokens: impl Iterator<Item = &'a String>,
    ) -> Result<HashMap<String, SynonymSet>, SynonymError> {
        let unique: HashSet<&String> = tokens.collect();
        let lookups = unique.into_iter().map(|token| async move {
            let set = self.synonyms_of(token).await?;
            Ok::<_, SynonymError>((token.clone(), set))
        });

        join_all(lookups).await.into_iter().collect()
    }

    async fn synonyms_of(&self, token: &str) -> Result<SynonymSet, SynonymError> {
        if let Some(hit) = self.cache.get(token) {
            return Ok(hit);
        }

        let words = match tokio::time::timeout(self.timeout, self.source.lookup(token)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(SynonymError::Timeout {
                    after_ms: self.timeout.as_millis(),
                });
            }
        };

        let mut set: HashSet<String> = words.into_iter().map(|w| w.to_lowercase()).collect();
        set.insert(token.to_string());
        let set: SynonymSet = Arc::new(set);
        self.cache.insert(token, set.clone());
        Ok(set)
    }
}

fn count_matched(
    tokens: &[String],
    others: &[String],
    synonyms: &HashMap<String, SynonymSet>,
) -> usize {
    let others_union: HashSet<&str> = others
        .iter()
        .filter_map(|t| synonyms.get(t))
        .flat_map(|set| set.iter().map(String::as_str))
        .collect();

    tokens
        .iter()
        .filter(|token| {
            synonyms
                .get(*token)
                .is_some_and(|set| set.iter().any(|w| others_union.contains(w.as_str())))
        })
        .count()
}
