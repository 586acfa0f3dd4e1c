//! Storage error types.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A call to the S3 API failed.
    #[error("S3 {operation} failed: {source}")]
    S3 {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("upload URL expired")]
    Expired,

    #[error("invalid upload signature")]
    InvalidSignature,
}

impl StorageError {
    pub(crate) fn s3(operation: &'static str, source: impl Into<BoxError>) -> Self {
        Self::S3 {
            operation,
            source: source.into(),
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
