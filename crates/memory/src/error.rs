use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("memory store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("memory store unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("memory record could not be encoded: {0}")]
    Serialize(#[from] serde_json::Error),
}
