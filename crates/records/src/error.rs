//! Record store error types.

use thiserror::Error;

/// Record store operation errors.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// A stored row could not be decoded into a record.
    #[error("corrupt record {contract_id}: {reason}")]
    Corrupt { contract_id: String, reason: String },
}

/// Result type for record store operations.
pub type RecordResult<T> = std::result::Result<T, RecordError>;
