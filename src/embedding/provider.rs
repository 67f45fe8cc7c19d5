use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, instrument, warn};

use crate::config::EngineConfig;
use crate::hashing::{hash_text, normalize_text};

use super::bert::BertEncoder;
use super::cache::{Embedding, EmbeddingCache};
use super::encoder::{HashingEncoder, TextEncoder};
use super::error::EmbeddingError;

type EncoderLoader =
    Arc<dyn Fn() -> Result<Arc<dyn TextEncoder>, EmbeddingError> + Send + Sync + 'static>;

/// One shared inference per normalized text; `None` records a degraded attempt.
type InFlight = Arc<OnceCell<Option<Embedding>>>;

/// Lazily-initialized text embedding with an injected cache.
///
/// The encoder is loaded at most once: concurrent first callers wait on the same
/// in-flight load, and the load keeps running after a caller's deadline passes.
/// A failed load is not remembered, so a later call retries. Concurrent misses on
/// the same normalized text share one inference. Inference failures and timeouts
/// surface as `Ok(None)`; callers degrade to lexical scoring.
pub struct EmbeddingProvider {
    loader: EncoderLoader,
    encoder: Arc<OnceCell<Arc<dyn TextEncoder>>>,
    cache: Arc<EmbeddingCache>,
    in_flight: Mutex<HashMap<[u8; 32], InFlight>>,
    timeout: Duration,
    load_attempts: Arc<AtomicU64>,
}

impl std::fmt::Debug for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingProvider")
            .field("loaded", &self.encoder.initialized())
            .field("cache", &self.cache)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl EmbeddingProvider {
    /// Builds a provider from config: a BERT encoder when `model_path` is set,
    /// the hashing encoder otherwise.
    pub fn from_config(config: &EngineConfig, cache: Arc<EmbeddingCache>) -> Self {
        let model_path = config.model_path.clone();
        let loader = move || -> Result<Arc<dyn TextEncoder>, EmbeddingError> {
            let encoder: Arc<dyn TextEncoder> = match &model_path {
                Some(path) => Arc::new(BertEncoder::load(path)?),
                None => {
                    warn!("No RECLAIM_MODEL_PATH configured, using hashing text encoder");
                    Arc::new(HashingEncoder::default())
                }
            };
            Ok(encoder)
        };
        Self::with_loader(loader, cache, config.provider_timeout)
    }

    /// Builds a provider around a custom loader.
    pub fn with_loader<F>(loader: F, cache: Arc<EmbeddingCache>, timeout: Duration) -> Self
    where
        F: Fn() -> Result<Arc<dyn TextEncoder>, EmbeddingError> + Send + Sync + 'static,
    {
        Self {
            loader: Arc::new(loader),
            encoder: Arc::new(OnceCell::new()),
            cache,
            in_flight: Mutex::new(HashMap::new()),
            timeout,
            load_attempts: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Builds a provider around an already-constructed encoder.
    pub fn with_encoder(
        encoder: Arc<dyn TextEncoder>,
        cache: Arc<EmbeddingCache>,
        timeout: Duration,
    ) -> Self {
        Self::with_loader(move || Ok(encoder.clone()), cache, timeout)
    }

    /// Hashing encoder, default cache, generous timeout. Deterministic; for tests and demos.
    pub fn hashing() -> Self {
        Self::with_encoder(
            Arc::new(HashingEncoder::default()),
            Arc::new(EmbeddingCache::default()),
            Duration::from_secs(30),
        )
    }

    /// Embeds `text` after normalizing it (lower-case, trim).
    ///
    /// Returns `Err(EmptyInput)` for blank text and `Ok(None)` when the encoder is
    /// unavailable.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn embed(&self, text: &str) -> Result<Option<Embedding>, EmbeddingError> {
        let normalized = normalize_text(text);
        if normalized.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let key = hash_text(&normalized);
        let cell = {
            let mut in_flight = self.in_flight.lock();
            // Checked under the lock: a finished inference is cached before its
            // cell leaves the map.
            if let Some(hit) = self.cache.get(&normalized) {
                debug!("Embedding cache hit");
                return Ok(Some(hit));
            }
            in_flight.entry(key).or_default().clone()
        };

        let embedding = cell
            .get_or_init(|| async {
                match self.infer(normalized.clone()).await {
                    Ok(embedding) => {
                        self.cache.insert(&normalized, embedding.clone());
                        Some(embedding)
                    }
                    Err(e) => {
                        warn!(error = %e, "Embedding unavailable, degrading to lexical scoring");
                        None
                    }
                }
            })
            .await
            .clone();

        let mut in_flight = self.in_flight.lock();
        if in_flight
            .get(&key)
            .is_some_and(|current| Arc::ptr_eq(current, &cell))
        {
            in_flight.remove(&key);
        }
        Ok(embedding)
    }

    /// Returns `true` once the encoder has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.encoder.initialized()
    }

    /// Number of load attempts so far (successful or not).
    pub fn load_attempts(&self) -> u64 {
        self.load_attempts.load(Ordering::Relaxed)
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    async fn encoder(&self) -> Result<Arc<dyn TextEncoder>, EmbeddingError> {
        if let Some(encoder) = self.encoder.get() {
            return Ok(encoder.clone());
        }

        let cell = self.encoder.clone();
        let loader = self.loader.clone();
        let attempts = self.load_attempts.clone();
        // Detached: dropping the handle on timeout leaves the load running.
        let load = tokio::spawn(async move {
            cell.get_or_try_init(|| async move {
                attempts.fetch_add(1, Ordering::Relaxed);
                let encoder = tokio::task::spawn_blocking(move || loader())
                    .await
                    .map_err(|e| EmbeddingError::ModelLoadFailed {
                        reason: format!("encoder load task failed: {}", e),
                    })??;
                info!(
                    encoder = encoder.name(),
                    dim = encoder.dim(),
                    "Text encoder ready"
                );
                Ok::<_, EmbeddingError>(encoder)
            })
            .await
            .cloned()
        });

        load.await.map_err(|e| EmbeddingError::ModelLoadFailed {
            reason: format!("encoder load task failed: {}", e),
        })?
    }

    /// Loads the encoder if needed and encodes, both under one deadline.
    async fn infer(&self, normalized: String) -> Result<Embedding, EmbeddingError> {
        let deadline = Instant::now() + self.timeout;
        let timed_out = || EmbeddingError::Timeout {
            after_ms: self.timeout.as_millis(),
        };

        let encoder = timeout_at(deadline, self.encoder())
            .await
            .map_err(|_| timed_out())??;
        let task = tokio::task::spawn_blocking(move || encoder.encode(&normalized));

        match timeout_at(deadline, task).await {
            Ok(Ok(result)) => result.map(Embedding::from),
            Ok(Err(e)) => Err(EmbeddingError::InferenceFailed {
                reason: format!("encoder task failed: {}", e),
            }),
            Err(_) => Err(timed_out()),
        }
    }
}
