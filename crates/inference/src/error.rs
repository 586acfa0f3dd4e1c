//! Inference error types.

use thiserror::Error;

/// Errors talking to a language model.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("inference endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model {model} returned an empty completion")]
    EmptyCompletion { model: String },

    #[error("could not decode inference response: {0}")]
    Decode(String),

    #[error("OpenAI-compatible API error: {0}")]
    OpenAi(#[from] async_openai::error::OpenAIError),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for inference operations.
pub type InferenceResult<T> = std::result::Result<T, InferenceError>;
