use thiserror::Error;
use uuid::Uuid;

use crate::error::EngineError;
use crate::persistence::StoreError;

#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("claim {claim_id} cannot move from {from} to {to}")]
    InvalidTransition {
        claim_id: Uuid,
        from: &'static str,
        to: &'static str,
    },

    #[error("a claim must link one lost item and one found item")]
    KindMismatch,

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
