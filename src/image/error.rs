use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image inference request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("image inference service returned status {status}")]
    Status { status: u16 },

    #[error("image inference timed out after {after_ms}ms")]
    Timeout { after_ms: u128 },

    #[error("invalid image inference response: {reason}")]
    InvalidResponse { reason: String },
}
