use super::*;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

struct CountingSource {
    inner: StaticSynonyms,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl SynonymSource for CountingSource {
    async fn lookup(&self, token: &str) -> Result<Vec<String>, SynonymError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup(token).await
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

struct SlowSource;

#[async_trait]
impl SynonymSource for SlowSource {
    async fn lookup(&self, _token: &str) -> Result<Vec<String>, SynonymError> {
        tokio::time::sleep(Duration::from_millis(300)).await;
        Ok(vec!["anything".to_string()])
    }

    fn name(&self) -> &'static str {
        "slow"
    }
}

fn scorer_with(source: Arc<dyn SynonymSource>, timeout: Duration) -> LexicalScorer {
    LexicalScorer::new(source, SynonymCache::new(100, Duration::from_secs(60)), timeout)
}

mod tokenize_tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_splits_on_punctuation() {
        assert_eq!(
            tokenize("Black, Leather-Wallet!"),
            vec!["black", "leather", "wallet"]
        );
    }

    #[test]
    fn test_tokenize_punctuation_only_is_empty() {
        assert!(tokenize(" ?! -- ").is_empty());
    }
}

mod char_similarity_tests {
    use super::*;

    #[test]
    fn test_identical_strings() {
        assert_eq!(char_similarity("wallet", "wallet"), 1.0);
    }

    #[test]
    fn test_whitespace_is_ignored() {
        assert_eq!(char_similarity("blue bag", "bluebag"), 1.0);
    }

    #[test]
    fn test_known_value() {
        assert!((char_similarity("night", "nacht") - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_disjoint_and_empty() {
        assert_eq!(char_similarity("blue", "xyz"), 0.0);
        assert_eq!(char_similarity("", ""), 0.0);
        assert_eq!(char_similarity("a", "ab"), 0.0);
    }
}

mod scorer_tests {
    use super::*;

    #[tokio::test]
    async fn test_synonyms_make_paraphrases_identical() {
        let scorer = LexicalScorer::builtin();
        let score = scorer.similarity("black wallet", "dark wallet").await;
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_partial_overlap() {
        let scorer = LexicalScorer::builtin();
        let score = scorer.similarity("brown leather", "dark brown leather").await;
        assert!((score - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_unrelated_text_scores_zero() {
        let scorer = LexicalScorer::builtin();
        assert_eq!(scorer.similarity("blue phone", "brown wallet").await, 0.0);
    }

    #[tokio::test]
    async fn test_zero_synonym_score_falls_back_to_characters() {
        let scorer = LexicalScorer::builtin();
        let score = scorer.similarity("walet", "wallet").await;
        assert_eq!(score, char_similarity("walet", "wallet"));
        assert!(score > 0.5);
    }

    #[tokio::test]
    async fn test_similarity_is_symmetric_and_bounded() {
        let scorer = LexicalScorer::builtin();
        let texts = [
            "black wallet",
            "dark leather purse",
            "Blue Phone with cracked screen",
            "mobile",
            "!!!",
            "",
            "keys on a red keyring",
            "brown leather",
            "dark brown leather",
            "walet",
        ];

        for a in texts {
            for b in texts {
                let ab = scorer.similarity(a, b).await;
                let ba = scorer.similarity(b, a).await;
                assert_eq!(ab, ba, "asymmetric for {a:?} / {b:?}");
                assert!((0.0..=1.0).contains(&ab), "out of range for {a:?} / {b:?}");
            }
        }
    }

    #[tokio::test]
    async fn test_disabled_uses_character_similarity() {
        let scorer = LexicalScorer::disabled();
        let score = scorer.similarity("black wallet", "dark wallet").await;
        assert_eq!(score, char_similarity("black wallet", "dark wallet"));
        assert!(score < 1.0);
    }

    #[tokio::test]
    async fn test_unavailable_source_falls_back() {
        let scorer = scorer_with(Arc::new(NoSynonyms), Duration::from_secs(1));
        let score = scorer.similarity("Black Wallet", "dark wallet").await;
        assert_eq!(score, char_similarity("black wallet", "dark wallet"));
        assert!(scorer.cache().is_empty());
    }

    #[tokio::test]
    async fn test_slow_source_times_out_and_falls_back() {
        let scorer = scorer_with(Arc::new(SlowSource), Duration::from_millis(20));
        let score = scorer.similarity("black wallet", "dark wallet").await;
        assert_eq!(score, char_similarity("black wallet", "dark wallet"));
    }

    #[tokio::test]
    async fn test_punctuation_only_side_uses_character_similarity() {
        let scorer = LexicalScorer::builtin();
        assert_eq!(scorer.similarity("!!!", "wallet").await, 0.0);
        assert_eq!(scorer.similarity("", "").await, 0.0);
    }

    #[tokio::test]
    async fn test_lookups_are_cached_per_token() {
        let calls = Arc::new(AtomicUsize::new(0));
        let scorer = scorer_with(
            Arc::new(CountingSource {
                inner: StaticSynonyms::builtin(),
                calls: calls.clone(),
            }),
            Duration::from_secs(1),
        );

        scorer.similarity("black wallet", "dark wallet").await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        scorer.similarity("wallet", "black").await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(scorer.cache().len(), 3);
    }

    #[tokio::test]
    async fn test_from_config_builtin_backend() {
        let config = EngineConfig {
            synonym_backend: SynonymBackend::Builtin,
            ..Default::default()
        };
        let scorer = LexicalScorer::from_config(&config);
        let score = scorer.similarity("phone", "mobile").await;
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_datamuse_client_builds_with_configured_timeout() {
        let source =
            DatamuseSynonyms::new("https://api.datamuse.com/words/", Duration::from_millis(250))
                .unwrap();
        assert_eq!(source.name(), "datamuse");
    }

    #[tokio::test]
    async fn test_from_config_disabled() {
        let config = EngineConfig {
            synonyms_enabled: false,
            ..Default::default()
        };
        let scorer = LexicalScorer::from_config(&config);
        assert_eq!(
            scorer.similarity("phone", "mobile").await,
            char_similarity("phone", "mobile")
        );
    }
}

mod static_source_tests {
    use super::*;

    #[tokio::test]
    async fn test_groups_are_symmetric() {
        let source = StaticSynonyms::from_groups(&[&["Wallet", "purse"]]);
        assert_eq!(source.lookup("wallet").await.unwrap(), vec!["purse"]);
        assert_eq!(source.lookup("purse").await.unwrap(), vec!["wallet"]);
        assert!(source.lookup("phone").await.unwrap().is_empty());
        assert_eq!(source.len(), 2);
    }
}
