//! OpenAI-compatible chat completions backend.

use crate::error::{InferenceError, InferenceResult};
use crate::traits::InferenceClient;
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(api_base: &str, api_key: &str, model: impl Into<String>, max_tokens: u32) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);

        Self {
            client: Client::with_config(config),
            model: model.into(),
            max_tokens,
        }
    }
}

#[async_trait]
impl InferenceClient for OpenAiClient {
    #[instrument(skip(self, prompt), fields(backend = "openai", model = %self.model, prompt_chars = prompt.len()))]
    async fn complete(&self, prompt: &str) -> InferenceResult<String> {
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![ChatCompletionRequestMessage::User(user)])
            .temperature(0.0)
            .max_tokens(self.max_tokens)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!(error = %e, "chat completion request failed");
            InferenceError::OpenAi(e)
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| InferenceError::EmptyCompletion {
                model: self.model.clone(),
            })?;

        debug!(completion_chars = content.len(), "completion received");
        Ok(content)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn backend_name(&self) -> &'static str {
        "openai"
    }
}
