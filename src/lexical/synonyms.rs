//! Synonym sources and the per-token synonym cache.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::sync::Cache;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tracing::debug;

use crate::constants::MAX_SYNONYMS_PER_TOKEN;

use super::error::SynonymError;

/// Expanded synonym set for one token; always contains the token itself.
pub type SynonymSet = Arc<HashSet<String>>;

#[async_trait]
/// Looks up synonyms for a single lower-cased token.
pub trait SynonymSource: Send + Sync {
    /// Returns synonyms of `token` (without the token itself).
    async fn lookup(&self, token: &str) -> Result<Vec<String>, SynonymError>;

    /// Short identifier for logs.
    fn name(&self) -> &'static str;
}

#[derive(Debug, Deserialize)]
struct DatamuseWord {
    word: String,
}

/// Datamuse `rel_syn` lookups over HTTP.
pub struct DatamuseSynonyms {
    endpoint: String,
    http: HttpClient,
}

impl DatamuseSynonyms {
    /// Fails when the HTTP client cannot be built with `timeout`.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, SynonymError> {
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http: HttpClient::builder().timeout(timeout).build()?,
        })
    }
}

#[async_trait]
impl SynonymSource for DatamuseSynonyms {
    async fn lookup(&self, token: &str) -> Result<Vec<String>, SynonymError> {
        let max = MAX_SYNONYMS_PER_TOKEN.to_string();
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("rel_syn", token), ("max", max.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SynonymError::Status {
                status: status.as_u16(),
            });
        }

        let words: Vec<DatamuseWord> = response.json().await?;
        debug!(token, count = words.len(), "Fetched synonyms");
        Ok(words
            .into_iter()
            .map(|w| w.word.to_lowercase())
            .take(MAX_SYNONYMS_PER_TOKEN)
            .collect())
    }

    fn name(&self) -> &'static str {
        "datamuse"
    }
}

/// In-memory synonym table. Groups are symmetric: every word maps to all others.
#[derive(Debug, Clone, Default)]
pub struct StaticSynonyms {
    table: HashMap<String, HashSet<String>>,
}

impl StaticSynonyms {
    pub fn from_groups(groups: &[&[&str]]) -> Self {
        let mut table: HashMap<String, HashSet<String>> = HashMap::new();
        for group in groups {
            for word in group.iter() {
                let entry = table.entry(word.to_lowercase()).or_default();
                for other in group.iter().filter(|o| *o != word) {
                    entry.insert(other.to_lowercase());
                }
            }
        }
        Self { table }
    }

    /// Offline table for common lost-and-found vocabulary.
    pub fn builtin() -> Self {
        Self::from_groups(&[
            &["black", "dark"],
            &["wallet", "purse", "billfold"],
            &["phone", "mobile", "cellphone", "smartphone"],
            &["bag", "backpack", "rucksack", "satchel"],
            &["keys", "keychain", "keyring"],
            &["laptop", "notebook", "macbook"],
            &["earphones", "earbuds", "headphones", "headset"],
            &["bottle", "flask", "tumbler"],
            &["jacket", "coat", "hoodie"],
            &["glasses", "spectacles", "eyeglasses"],
            &["umbrella", "brolly"],
            &["charger", "adapter"],
            &["watch", "wristwatch", "smartwatch"],
            &["id", "identity", "idcard"],
        ])
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[async_trait]
impl SynonymSource for StaticSynonyms {
    async fn lookup(&self, token: &str) -> Result<Vec<String>, SynonymError> {
        Ok(self
            .table
            .get(token)
            .map(|words| words.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Always unavailable; selecting it forces the character-similarity fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSynonyms;

#[async_trait]
impl SynonymSource for NoSynonyms {
    async fn lookup(&self, _token: &str) -> Result<Vec<String>, SynonymError> {
        Err(SynonymError::Unavailable {
            reason: "synonym lookup disabled".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Token → synonym set, TTL- and size-bound. Failed lookups are never cached.
pub struct SynonymCache {
    entries: Cache<String, SynonymSet>,
}

impl std::fmt::Debug for SynonymCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynonymCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl SynonymCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub fn get(&self, token: &str) -> Option<SynonymSet> {
        self.entries.get(token)
    }

    pub fn insert(&self, token: &str, synonyms: SynonymSet) {
        self.entries.insert(token.to_string(), synonyms);
    }

    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
    }
}
