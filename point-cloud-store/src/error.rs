use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Index did not resolve into `[0, len)` after negative-index normalisation.
    #[error("index {index} out of range for container of length {len}")]
    OutOfRange { index: isize, len: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read store configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed store configuration: {0}")]
    Json(#[from] serde_json::Error),
}
