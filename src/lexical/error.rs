use thiserror::Error;

#[derive(Debug, Error)]
pub enum SynonymError {
    #[error("synonym lookup request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("synonym service returned status {status}")]
    Status { status: u16 },

    #[error("synonym lookup timed out after {after_ms}ms")]
    Timeout { after_ms: u128 },

    #[error("synonym lookup unavailable: {reason}")]
    Unavailable { reason: String },
}
