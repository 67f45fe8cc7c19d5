//! Engine-level error taxonomy.
//!
//! Matching and verification only ever return [`EngineError::Input`] to callers.
//! Provider and candidate variants exist so degradations and skipped work are
//! logged with a consistent shape. Claim settlement surfaces persistence and
//! transition errors directly.

use thiserror::Error;

use crate::item::ItemId;
use crate::persistence::StoreError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Rejected input (empty text, missing required item fields). Never retried.
    #[error("invalid input: {reason}")]
    Input { reason: String },

    /// A similarity provider failed or timed out; the caller degrades.
    #[error("{provider} provider unavailable: {reason}")]
    ProviderUnavailable {
        provider: &'static str,
        reason: String,
    },

    /// A store write or read failed.
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    /// A single candidate could not be scored; the batch continues.
    #[error("candidate {item_id} skipped: {reason}")]
    Candidate { item_id: ItemId, reason: String },

    /// An item status transition is not allowed.
    #[error("item {item_id} cannot transition from {from} to {to}")]
    InvalidTransition {
        item_id: ItemId,
        from: &'static str,
        to: &'static str,
    },
}

impl EngineError {
    pub(crate) fn input(reason: impl Into<String>) -> Self {
        Self::Input {
            reason: reason.into(),
        }
    }

    /// Returns `true` for errors the caller must see.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Input { .. })
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
