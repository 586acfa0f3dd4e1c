//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid contract ID: {0}")]
    InvalidContractId(String),

    #[error("invalid file name: {0}")]
    InvalidFileName(String),

    #[error("unknown contract status: {0}")]
    UnknownStatus(String),

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("playbook error: {0}")]
    Playbook(String),

    #[error("document too large: {chars} characters (limit: {limit})")]
    DocumentTooLarge { chars: usize, limit: usize },

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
