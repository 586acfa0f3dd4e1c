//! Inference client trait.

use crate::error::InferenceResult;
use async_trait::async_trait;

/// A language model that turns one prompt into one completion.
#[async_trait]
pub trait InferenceClient: Send + Sync + 'static {
    /// Send `prompt` as a single user message and return the completion text.
    async fn complete(&self, prompt: &str) -> InferenceResult<String>;

    /// Model identifier, for logs.
    fn model(&self) -> &str;

    /// Get the name of this backend ("messages", "openai").
    fn backend_name(&self) -> &'static str;
}
