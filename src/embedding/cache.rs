//! Embedding cache keyed by normalized text.
//!
//! Keys are the BLAKE3 hash of the lower-cased, trimmed text, so lookups are exact:
//! two paraphrases never share an entry. Size-bound, optionally TTL-bound.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::sync::Cache;

use crate::hashing::hash_text;

/// Shared, immutable embedding vector.
pub type Embedding = Arc<[f32]>;

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub entries: u64,
    pub hits: u64,
    pub misses: u64,
}

pub struct EmbeddingCache {
    entries: Cache<[u8; 32], Embedding>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for EmbeddingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingCache")
            .field("stats", &self.stats())
            .finish()
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY, None)
    }
}

impl EmbeddingCache {
    const DEFAULT_CAPACITY: u64 = 50_000;

    /// Creates a cache holding at most `capacity` vectors, each living at most `ttl`.
    pub fn new(capacity: u64, ttl: Option<Duration>) -> Self {
        let mut builder = Cache::builder().max_capacity(capacity);
        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }
        Self {
            entries: builder.build(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Looks up already-normalized text.
    pub fn get(&self, normalized: &str) -> Option<Embedding> {
        let found = self.entries.get(&hash_text(normalized));
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    pub fn insert(&self, normalized: &str, embedding: Embedding) {
        self.entries.insert(hash_text(normalized), embedding);
    }

    pub fn contains(&self, normalized: &str) -> bool {
        self.entries.contains_key(&hash_text(normalized))
    }

    /// Drops every entry; counters are kept.
    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
    }

    pub fn stats(&self) -> CacheStats {
        self.entries.run_pending_tasks();
        CacheStats {
            entries: self.entries.entry_count(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
