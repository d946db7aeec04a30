//! Storage error types

/// Errors from durable storage and history export
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
