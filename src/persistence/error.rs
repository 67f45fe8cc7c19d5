use thiserror::Error;

use crate::item::ItemId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("item {id} not found")]
    NotFound { id: ItemId },

    #[error("failed to write item {id}: {reason}")]
    WriteFailed { id: ItemId, reason: String },

    #[error("item store unavailable: {reason}")]
    Unavailable { reason: String },
}
