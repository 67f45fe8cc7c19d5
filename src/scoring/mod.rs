//! Similarity combiner.
//!
//! Two weightings share this module:
//!
//! - Item pairs: name+description text score (embedding cosine, lexical when
//!   embeddings are down), optionally blended 40/60 with the image score.
//! - Answer verification: `semantic_weight * semantic + lexical_weight * lexical`,
//!   or the lexical score alone when the embedding step failed.

pub mod combiner;
pub mod types;


pub use combiner::Combiner;
pub use types::{ItemComparison, TextComparison, TextSignal};
