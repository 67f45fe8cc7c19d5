//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `RECLAIM_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_DISPLAY_THRESHOLD_PERCENT, DEFAULT_LEXICAL_WEIGHT, DEFAULT_MATCH_THRESHOLD,
    DEFAULT_SEMANTIC_WEIGHT, DEFAULT_VERIFY_THRESHOLD,
};

/// Default synonym service (Datamuse `rel_syn` queries).
pub const DEFAULT_SYNONYM_URL: &str = "https://api.datamuse.com/words";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Where the lexical scorer gets synonyms from.
pub enum SynonymBackend {
    #[default]
    /// Datamuse HTTP service.
    Datamuse,
    /// Offline builtin table.
    Builtin,
}

impl std::str::FromStr for SynonymBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "datamuse" | "http" => Ok(Self::Datamuse),
            "builtin" | "static" | "offline" => Ok(Self::Builtin),
            _ => Err(format!("Unknown synonym source: {}", s)),
        }
    }
}

/// Engine configuration loaded from environment variables.
///
/// Use [`EngineConfig::from_env`] to read `RECLAIM_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum text similarity for a match. Default: `0.70`.
    pub match_threshold: f32,

    /// Minimum combined similarity for an accepted answer. Default: `0.75`.
    pub verify_threshold: f32,

    /// Read-side display filter, exclusive. Default: `70`.
    pub display_threshold_percent: u8,

    /// Weight of the embedding signal in verification scoring. Default: `0.75`.
    pub semantic_weight: f32,

    /// Weight of the lexical signal in verification scoring. Default: `0.25`.
    pub lexical_weight: f32,

    /// Score matches with the text+image blend when both items carry images. Default: `false`.
    pub use_image_signal: bool,

    /// Whether to query the synonym service at all. Default: `true`.
    pub synonyms_enabled: bool,

    /// Synonym backend. Default: Datamuse.
    pub synonym_backend: SynonymBackend,

    /// Synonym service endpoint.
    pub synonym_endpoint: String,

    /// TTL of cached synonym sets. Default: one day.
    pub synonym_cache_ttl: Duration,

    /// Max cached synonym sets. Default: `10_000`.
    pub synonym_cache_capacity: u64,

    /// Max cached embeddings. Default: `50_000`.
    pub embedding_cache_capacity: u64,

    /// Optional TTL for cached embeddings (size-bound only when unset).
    pub embedding_cache_ttl: Option<Duration>,

    /// Directory holding a BERT-style sentence encoder. Unset selects the hashing encoder.
    pub model_path: Option<PathBuf>,

    /// Local zero-shot image inference endpoint. Unset disables the image module.
    pub image_endpoint: Option<String>,

    /// Per-call timeout for embedding, image and synonym providers. Default: 5s.
    pub provider_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            verify_threshold: DEFAULT_VERIFY_THRESHOLD,
            display_threshold_percent: DEFAULT_DISPLAY_THRESHOLD_PERCENT,
            semantic_weight: DEFAULT_SEMANTIC_WEIGHT,
            lexical_weight: DEFAULT_LEXICAL_WEIGHT,
            use_image_signal: false,
            synonyms_enabled: true,
            synonym_backend: SynonymBackend::default(),
            synonym_endpoint: DEFAULT_SYNONYM_URL.to_string(),
            synonym_cache_ttl: Duration::from_secs(24 * 60 * 60),
            synonym_cache_capacity: 10_000,
            embedding_cache_capacity: 50_000,
            embedding_cache_ttl: None,
            model_path: None,
            image_endpoint: None,
            provider_timeout: Duration::from_millis(5_000),
        }
    }
}

impl EngineConfig {
    const ENV_MATCH_THRESHOLD: &'static str = "RECLAIM_MATCH_THRESHOLD";
    const ENV_VERIFY_THRESHOLD: &'static str = "RECLAIM_VERIFY_THRESHOLD";
    const ENV_DISPLAY_THRESHOLD: &'static str = "RECLAIM_DISPLAY_THRESHOLD";
    const ENV_SEMANTIC_WEIGHT: &'static str = "RECLAIM_SEMANTIC_WEIGHT";
    const ENV_LEXICAL_WEIGHT: &'static str = "RECLAIM_LEXICAL_WEIGHT";
    const ENV_USE_IMAGE_SIGNAL: &'static str = "RECLAIM_USE_IMAGE_SIGNAL";
    const ENV_SYNONYMS_ENABLED: &'static str = "RECLAIM_SYNONYMS_ENABLED";
    const ENV_SYNONYM_SOURCE: &'static str = "RECLAIM_SYNONYM_SOURCE";
    const ENV_SYNONYM_URL: &'static str = "RECLAIM_SYNONYM_URL";
    const ENV_SYNONYM_CACHE_TTL_SECS: &'static str = "RECLAIM_SYNONYM_CACHE_TTL_SECS";
    const ENV_SYNONYM_CACHE_CAPACITY: &'static str = "RECLAIM_SYNONYM_CACHE_CAPACITY";
    const ENV_EMBEDDING_CACHE_CAPACITY: &'static str = "RECLAIM_EMBEDDING_CACHE_CAPACITY";
    const ENV_EMBEDDING_CACHE_TTL_SECS: &'static str = "RECLAIM_EMBEDDING_CACHE_TTL_SECS";
    const ENV_MODEL_PATH: &'static str = "RECLAIM_MODEL_PATH";
    const ENV_IMAGE_ENDPOINT: &'static str = "RECLAIM_IMAGE_ENDPOINT";
    const ENV_PROVIDER_TIMEOUT_MS: &'static str = "RECLAIM_PROVIDER_TIMEOUT_MS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let match_threshold = Self::parse_f32_from_env(Self::ENV_MATCH_THRESHOLD)?
            .unwrap_or(defaults.match_threshold);
        let verify_threshold = Self::parse_f32_from_env(Self::ENV_VERIFY_THRESHOLD)?
            .unwrap_or(defaults.verify_threshold);
        let display_threshold_percent = Self::parse_u64_from_env(Self::ENV_DISPLAY_THRESHOLD)?
            .map(|v| u8::try_from(v).unwrap_or(u8::MAX))
            .unwrap_or(defaults.display_threshold_percent);
        let semantic_weight = Self::parse_f32_from_env(Self::ENV_SEMANTIC_WEIGHT)?
            .unwrap_or(defaults.semantic_weight);
        let lexical_weight = Self::parse_f32_from_env(Self::ENV_LEXICAL_WEIGHT)?
            .unwrap_or(defaults.lexical_weight);
        let use_image_signal =
            Self::parse_bool_from_env(Self::ENV_USE_IMAGE_SIGNAL, defaults.use_image_signal);
        let synonyms_enabled =
            Self::parse_bool_from_env(Self::ENV_SYNONYMS_ENABLED, defaults.synonyms_enabled);
        let synonym_backend = match Self::parse_optional_string_from_env(Self::ENV_SYNONYM_SOURCE)
        {
            Some(value) => value
                .parse::<SynonymBackend>()
                .map_err(|reason| ConfigError::ParseError {
                    name: Self::ENV_SYNONYM_SOURCE,
                    value,
                    reason,
                })?,
            None => defaults.synonym_backend,
        };
        let synonym_endpoint =
            Self::parse_optional_string_from_env(Self::ENV_SYNONYM_URL)
                .unwrap_or(defaults.synonym_endpoint);
        let synonym_cache_ttl = Self::parse_u64_from_env(Self::ENV_SYNONYM_CACHE_TTL_SECS)?
            .map(Duration::from_secs)
            .unwrap_or(defaults.synonym_cache_ttl);
        let synonym_cache_capacity = Self::parse_u64_from_env(Self::ENV_SYNONYM_CACHE_CAPACITY)?
            .unwrap_or(defaults.synonym_cache_capacity);
        let embedding_cache_capacity =
            Self::parse_u64_from_env(Self::ENV_EMBEDDING_CACHE_CAPACITY)?
                .unwrap_or(defaults.embedding_cache_capacity);
        let embedding_cache_ttl = Self::parse_u64_from_env(Self::ENV_EMBEDDING_CACHE_TTL_SECS)?
            .map(Duration::from_secs);
        let model_path =
            Self::parse_optional_string_from_env(Self::ENV_MODEL_PATH).map(PathBuf::from);
        let image_endpoint = Self::parse_optional_string_from_env(Self::ENV_IMAGE_ENDPOINT);
        let provider_timeout = Self::parse_u64_from_env(Self::ENV_PROVIDER_TIMEOUT_MS)?
            .map(Duration::from_millis)
            .unwrap_or(defaults.provider_timeout);

        Ok(Self {
            match_threshold,
            verify_threshold,
            display_threshold_percent,
            semantic_weight,
            lexical_weight,
            use_image_signal,
            synonyms_enabled,
            synonym_backend,
            synonym_endpoint,
            synonym_cache_ttl,
            synonym_cache_capacity,
            embedding_cache_capacity,
            embedding_cache_ttl,
            model_path,
            image_endpoint,
            provider_timeout,
        })
    }

    /// Validates ranges, weights and paths (does not touch the network).
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::check_threshold("match_threshold", self.match_threshold)?;
        Self::check_threshold("verify_threshold", self.verify_threshold)?;

        if self.display_threshold_percent > 100 {
            return Err(ConfigError::PercentOutOfRange {
                value: self.display_threshold_percent,
            });
        }

        let weights_valid = self.semantic_weight.is_finite()
            && self.lexical_weight.is_finite()
            && self.semantic_weight >= 0.0
            && self.lexical_weight >= 0.0
            && self.semantic_weight + self.lexical_weight > 0.0;
        if !weights_valid {
            return Err(ConfigError::InvalidWeights {
                semantic: self.semantic_weight,
                lexical: self.lexical_weight,
            });
        }

        if self.synonym_cache_capacity == 0 {
            return Err(ConfigError::ZeroValue {
                name: "synonym_cache_capacity",
            });
        }
        if self.embedding_cache_capacity == 0 {
            return Err(ConfigError::ZeroValue {
                name: "embedding_cache_capacity",
            });
        }
        if self.provider_timeout.is_zero() {
            return Err(ConfigError::ZeroValue {
                name: "provider_timeout",
            });
        }

        if self.synonyms_enabled && self.synonym_backend == SynonymBackend::Datamuse {
            Self::check_url("synonym_endpoint", &self.synonym_endpoint)?;
        }
        if let Some(ref endpoint) = self.image_endpoint {
            Self::check_url("image_endpoint", endpoint)?;
        }

        if let Some(ref path) = self.model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        Ok(())
    }

    /// Returns `(semantic, lexical)` weights re-normalized to sum to 1.
    ///
    /// Falls back to the defaults if the configured pair is unusable.
    pub fn normalized_weights(&self) -> (f32, f32) {
        let sum = self.semantic_weight + self.lexical_weight;
        if !sum.is_finite() || sum <= 0.0 || self.semantic_weight < 0.0 || self.lexical_weight < 0.0
        {
            return (DEFAULT_SEMANTIC_WEIGHT, DEFAULT_LEXICAL_WEIGHT);
        }
        (self.semantic_weight / sum, self.lexical_weight / sum)
    }

    fn check_threshold(name: &'static str, value: f32) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::ThresholdOutOfRange { name, value });
        }
        Ok(())
    }

    fn check_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
        if value.starts_with("http://") || value.starts_with("https://") {
            Ok(())
        } else {
            Err(ConfigError::InvalidUrl {
                name,
                value: value.to_string(),
            })
        }
    }

    fn parse_f32_from_env(var_name: &'static str) -> Result<Option<f32>, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse::<f32>()
                .map(Some)
                .map_err(|e| ConfigError::ParseError {
                    name: var_name,
                    value,
                    reason: e.to_string(),
                }),
            Err(_) => Ok(None),
        }
    }

    fn parse_u64_from_env(var_name: &'static str) -> Result<Option<u64>, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|e| ConfigError::ParseError {
                    name: var_name,
                    value,
                    reason: e.to_string(),
                }),
            Err(_) => Ok(None),
        }
    }

    fn parse_bool_from_env(var_name: &str, default: bool) -> bool {
        env::var(var_name)
            .map(|s| {
                let s = s.trim().to_ascii_lowercase();
                s != "false" && s != "0" && s != "no" && s != "off"
            })
            .unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
