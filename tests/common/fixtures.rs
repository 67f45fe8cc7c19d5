//! Item and engine builders shared by the integration tests.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, TimeZone, Utc};

use reclaim::{
    AnswerVerifier, Combiner, EmbeddingCache, EmbeddingError, EmbeddingProvider, EngineConfig,
    Item, LexicalScorer, MatchEngine, MemoryItemStore, SynonymBackend,
};

/// Midnight-relative day offsets from a fixed reporting week.
pub fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap() + Duration::days(n)
}

pub fn lost_wallet() -> Item {
    Item::lost(
        "student-17",
        "Black Leather Wallet",
        "Leather wallet with student ID card",
        "Library",
        day(1),
    )
}

pub fn found_wallet(when: DateTime<Utc>) -> Item {
    Item::found(
        "staff-4",
        "Dark Brown Leather Wallet",
        "Found a leather wallet with a student ID card",
        "Library",
        when,
    )
    .with_verification("What colour is the wallet?", "dark brown leather")
}

/// Default config with the offline synonym table.
pub fn offline_config() -> EngineConfig {
    EngineConfig {
        synonym_backend: SynonymBackend::Builtin,
        ..Default::default()
    }
}

pub fn engine_with(items: Vec<Item>) -> MatchEngine<MemoryItemStore> {
    MatchEngine::from_config(offline_config(), Arc::new(MemoryItemStore::with_items(items)))
}

pub fn hashing_combiner() -> Combiner {
    Combiner::new(
        Arc::new(EmbeddingProvider::hashing()),
        Arc::new(LexicalScorer::builtin()),
    )
}

/// A combiner whose encoder never loads.
pub fn lexical_only_combiner() -> Combiner {
    let embeddings = EmbeddingProvider::with_loader(
        || {
            Err(EmbeddingError::ModelLoadFailed {
                reason: "weights missing".to_string(),
            })
        },
        Arc::new(EmbeddingCache::default()),
        StdDuration::from_secs(1),
    );
    Combiner::new(Arc::new(embeddings), Arc::new(LexicalScorer::builtin()))
}

pub fn verifier(combiner: Combiner) -> AnswerVerifier {
    AnswerVerifier::new(Arc::new(combiner))
}
