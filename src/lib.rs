//! Reclaim matching and verification engine.
//!
//! Decides whether a newly reported lost or found item matches existing items of
//! the opposite kind, persists those decisions on both sides, and checks whether
//! a free-text answer proves ownership of a found item.
//!
//! # Modules
//!
//! - [`embedding`]: lazily loaded text encoder with an injected cache
//! - [`lexical`]: synonym-aware lexical similarity with a character fallback
//! - [`image`]: optional zero-shot image similarity
//! - [`scoring`]: the [`Combiner`] that blends the signals
//! - [`gate`]: location adjacency and time ordering
//! - [`matching`]: the [`MatchFinder`]
//! - [`persistence`]: the [`ItemStore`] seam, match recording and reads
//! - [`verify`]: the [`AnswerVerifier`]
//! - [`engine`]: the [`MatchEngine`] facade
//!
//! Every provider degrades instead of failing: semantic → lexical → character
//! similarity. Only invalid input is returned as an error.

pub mod claim;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod gate;
pub mod hashing;
pub mod image;
pub mod item;
pub mod lexical;
pub mod matching;
pub mod persistence;
pub mod scoring;
pub mod verify;

pub use claim::{Claim, ClaimError, ClaimStatus, settle_verified_claim};
pub use config::{ConfigError, EngineConfig, SynonymBackend};
pub use embedding::{
    EmbeddingCache, EmbeddingError, EmbeddingProvider, HashingEncoder, TextEncoder,
    cosine_similarity,
};
pub use engine::{MatchEngine, MatchEvent, MatchOutcome};
pub use error::{EngineError, EngineResult};
pub use gate::{LocationGraph, time_valid};
pub use image::{ImageSimilarity, StubImageLabeler};
pub use item::{Item, ItemId, ItemKind, ItemStatus, MatchMethod, MatchRef};
pub use lexical::{LexicalScorer, StaticSynonyms, char_similarity};
pub use matching::{FoundMatch, MatchFinder, PairScorer};
pub use persistence::{ItemStore, MatchReader, MatchRecorder, MemoryItemStore, PersistReport, StoreError};
pub use scoring::{Combiner, ItemComparison, TextComparison, TextSignal};
pub use verify::{AnswerVerifier, Verification};
