use super::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

struct CountingEncoder {
    inner: HashingEncoder,
    calls: Arc<AtomicUsize>,
}

impl TextEncoder for CountingEncoder {
    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.encode(text)
    }

    fn dim(&self) -> usize {
        self.inner.dim()
    }

    fn name(&self) -> &str {
        "counting"
    }
}

struct FailingEncoder;

impl TextEncoder for FailingEncoder {
    fn encode(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::InferenceFailed {
            reason: "forced failure".to_string(),
        })
    }

    fn dim(&self) -> usize {
        8
    }

    fn name(&self) -> &str {
        "failing"
    }
}

struct SlowEncoder;

impl TextEncoder for SlowEncoder {
    fn encode(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        std::thread::sleep(Duration::from_millis(300));
        Ok(vec![1.0; 4])
    }

    fn dim(&self) -> usize {
        4
    }

    fn name(&self) -> &str {
        "slow"
    }
}

fn counting_provider() -> (EmbeddingProvider, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let encoder = Arc::new(CountingEncoder {
        inner: HashingEncoder::default(),
        calls: calls.clone(),
    });
    let provider = EmbeddingProvider::with_encoder(
        encoder,
        Arc::new(EmbeddingCache::default()),
        Duration::from_secs(5),
    );
    (provider, calls)
}

mod cosine_tests {
    use super::*;

    #[test]
    fn test_identical_vectors_score_one() {
        let v = vec![0.3, 0.1, 0.7, 0.2];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_dimension_mismatch_scores_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_empty_and_zero_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_opposite_vectors_clamp_to_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]), 0.0);
    }
}

mod encoder_tests {
    use super::*;

    #[test]
    fn test_hashing_encoder_is_normalized_and_non_negative() {
        let encoder = HashingEncoder::default();
        let v = encoder.encode("black leather wallet").unwrap();

        assert_eq!(v.len(), encoder.dim());
        assert!(v.iter().all(|x| *x >= 0.0));
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_hashing_encoder_shared_words_are_close() {
        let encoder = HashingEncoder::default();
        let a = encoder.encode("black leather wallet").unwrap();
        let b = encoder.encode("brown leather wallet").unwrap();
        let c = encoder.encode("blue umbrella").unwrap();

        assert!(cosine_similarity(&a, &b) > cosine_similarity(&a, &c));
    }

    #[test]
    fn test_hashing_encoder_punctuation_only_is_zero_vector() {
        let encoder = HashingEncoder::default();
        let v = encoder.encode("!!! ???").unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_hashing_encoder_rejects_zero_dim() {
        assert!(matches!(
            HashingEncoder::new(0),
            Err(EmbeddingError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_bert_encoder_missing_dir() {
        let err = BertEncoder::load("/nonexistent/models/minilm").unwrap_err();
        assert!(matches!(err, EmbeddingError::ModelNotFound { .. }));
    }

    #[test]
    fn test_bert_encoder_missing_weights() {
        let err = BertEncoder::load(env!("CARGO_MANIFEST_DIR")).unwrap_err();
        assert!(matches!(err, EmbeddingError::ModelNotFound { .. }));
    }
}

mod cache_tests {
    use super::*;

    #[test]
    fn test_cache_hit_and_miss_counters() {
        let cache = EmbeddingCache::new(16, None);
        assert!(cache.get("wallet").is_none());

        cache.insert("wallet", Embedding::from(vec![1.0, 0.0]));
        assert!(cache.get("wallet").is_some());
        assert!(cache.contains("wallet"));

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_cache_clear() {
        let cache = EmbeddingCache::new(16, None);
        cache.insert("wallet", Embedding::from(vec![1.0]));
        cache.insert("phone", Embedding::from(vec![0.5]));

        cache.clear();
        assert_eq!(cache.stats().entries, 0);
        assert!(!cache.contains("wallet"));
    }

    #[test]
    fn test_cache_ttl_expires() {
        let cache = EmbeddingCache::new(16, Some(Duration::from_millis(50)));
        cache.insert("wallet", Embedding::from(vec![1.0]));
        std::thread::sleep(Duration::from_millis(120));
        assert!(cache.get("wallet").is_none());
    }
}

mod provider_tests {
    use super::*;

    #[tokio::test]
    async fn test_embed_empty_input_is_error() {
        let provider = EmbeddingProvider::hashing();
        assert!(matches!(
            provider.embed("   ").await,
            Err(EmbeddingError::EmptyInput)
        ));
    }

    #[tokio::test]
    async fn test_embed_normalized_text_hits_cache() {
        let (provider, calls) = counting_provider();

        let a = provider.embed("Black Wallet").await.unwrap().unwrap();
        let b = provider.embed("  black wallet ").await.unwrap().unwrap();
        let c = provider.embed("BLACK WALLET").await.unwrap().unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(provider.cache().stats().hits, 2);
    }

    #[tokio::test]
    async fn test_embed_distinct_text_invokes_encoder() {
        let (provider, calls) = counting_provider();

        provider.embed("black wallet").await.unwrap();
        provider.embed("black wallets").await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_inference_failure_degrades_to_none() {
        let provider = EmbeddingProvider::with_encoder(
            Arc::new(FailingEncoder),
            Arc::new(EmbeddingCache::default()),
            Duration::from_secs(5),
        );

        assert!(provider.embed("wallet").await.unwrap().is_none());
        assert_eq!(provider.cache().stats().entries, 0);
    }

    #[tokio::test]
    async fn test_load_failure_degrades_and_retries() {
        let provider = EmbeddingProvider::with_loader(
            || {
                Err(EmbeddingError::ModelLoadFailed {
                    reason: "no weights".to_string(),
                })
            },
            Arc::new(EmbeddingCache::default()),
            Duration::from_secs(5),
        );

        assert!(provider.embed("wallet").await.unwrap().is_none());
        assert!(provider.embed("phone").await.unwrap().is_none());
        assert!(!provider.is_loaded());
        assert_eq!(provider.load_attempts(), 2);
    }

    #[tokio::test]
    async fn test_timeout_degrades_to_none() {
        let provider = EmbeddingProvider::with_encoder(
            Arc::new(SlowEncoder),
            Arc::new(EmbeddingCache::default()),
            Duration::from_millis(20),
        );

        assert!(provider.embed("wallet").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_callers_share_one_load() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = loads.clone();
        let provider = Arc::new(EmbeddingProvider::with_loader(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(100));
                let encoder: Arc<dyn TextEncoder> = Arc::new(HashingEncoder::default());
                Ok(encoder)
            },
            Arc::new(EmbeddingCache::default()),
            Duration::from_secs(5),
        ));

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let provider = provider.clone();
                tokio::spawn(async move { provider.embed(&format!("item {i}")).await })
            })
            .collect();

        for task in futures_util::future::join_all(tasks).await {
            assert!(task.unwrap().unwrap().is_some());
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(provider.load_attempts(), 1);
        assert!(provider.is_loaded());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_misses_on_same_text_share_one_inference() {
        let calls = Arc::new(AtomicUsize::new(0));
        let encoder = Arc::new(CountingEncoder {
            inner: HashingEncoder::default(),
            calls: calls.clone(),
        });
        let provider = Arc::new(EmbeddingProvider::with_loader(
            move || {
                std::thread::sleep(Duration::from_millis(50));
                let encoder: Arc<dyn TextEncoder> = encoder.clone();
                Ok(encoder)
            },
            Arc::new(EmbeddingCache::default()),
            Duration::from_secs(5),
        ));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let provider = provider.clone();
                tokio::spawn(async move { provider.embed("Black Leather Wallet").await })
            })
            .collect();

        let mut vectors = Vec::new();
        for task in futures_util::future::join_all(tasks).await {
            vectors.push(task.unwrap().unwrap().unwrap());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(vectors.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(provider.cache().stats().entries, 1);
    }

    #[tokio::test]
    async fn test_timed_out_inference_is_not_cached() {
        let provider = EmbeddingProvider::with_encoder(
            Arc::new(SlowEncoder),
            Arc::new(EmbeddingCache::default()),
            Duration::from_millis(20),
        );

        assert!(provider.embed("wallet").await.unwrap().is_none());
        assert!(provider.embed("wallet").await.unwrap().is_none());
        assert!(!provider.cache().contains("wallet"));
    }

    #[tokio::test]
    async fn test_slow_load_times_out_and_finishes_in_background() {
        let provider = EmbeddingProvider::with_loader(
            || {
                std::thread::sleep(Duration::from_millis(400));
                let encoder: Arc<dyn TextEncoder> = Arc::new(HashingEncoder::default());
                Ok(encoder)
            },
            Arc::new(EmbeddingCache::default()),
            Duration::from_millis(50),
        );

        let started = std::time::Instant::now();
        assert!(provider.embed("wallet").await.unwrap().is_none());
        assert!(started.elapsed() < Duration::from_millis(300));

        for _ in 0..40 {
            if provider.is_loaded() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(provider.is_loaded());
        assert!(provider.embed("wallet").await.unwrap().is_some());
        assert_eq!(provider.load_attempts(), 1);
    }

    #[tokio::test]
    async fn test_from_config_without_model_uses_hashing_encoder() {
        let config = crate::config::EngineConfig::default();
        let provider =
            EmbeddingProvider::from_config(&config, Arc::new(EmbeddingCache::default()));

        let v = provider.embed("wallet").await.unwrap().unwrap();
        assert_eq!(v.len(), crate::constants::HASHING_EMBEDDING_DIM);
    }

    #[tokio::test]
    async fn test_from_config_bad_model_path_degrades() {
        let config = crate::config::EngineConfig {
            model_path: Some("/nonexistent/models/minilm".into()),
            ..Default::default()
        };
        let provider =
            EmbeddingProvider::from_config(&config, Arc::new(EmbeddingCache::default()));

        assert!(provider.embed("wallet").await.unwrap().is_none());
    }
}
