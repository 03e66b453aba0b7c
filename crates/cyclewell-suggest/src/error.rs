use cyclewell_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Snapshot (de)serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SuggestError>;
