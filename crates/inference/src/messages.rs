//! Anthropic messages wire format over plain HTTP.
//!
//! Works against any endpoint that accepts the messages request body: the
//! Anthropic API, a Bedrock runtime gateway, or a local proxy.

use crate::error::{InferenceError, InferenceResult};
use crate::traits::InferenceClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Longest error body kept from a failed response.
const MAX_ERROR_BODY_CHARS: usize = 2000;

#[derive(Serialize)]
struct MessagesRequest<'a> {
    anthropic_version: &'a str,
    max_tokens: u32,
    model: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Client for a messages-format endpoint.
pub struct MessagesClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    anthropic_version: String,
    max_tokens: u32,
}

impl std::fmt::Debug for MessagesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagesClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl MessagesClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        anthropic_version: impl Into<String>,
        max_tokens: u32,
        timeout: Duration,
    ) -> InferenceResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InferenceError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key,
            model: model.into(),
            anthropic_version: anthropic_version.into(),
            max_tokens,
        })
    }
}

#[async_trait]
impl InferenceClient for MessagesClient {
    #[instrument(skip(self, prompt), fields(backend = "messages", model = %self.model, prompt_chars = prompt.len()))]
    async fn complete(&self, prompt: &str) -> InferenceResult<String> {
        let body = MessagesRequest {
            anthropic_version: &self.anthropic_version,
            max_tokens: self.max_tokens,
            model: &self.model,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let mut request = self
            .http
            .post(&self.endpoint)
            .header("anthropic-version", &self.anthropic_version)
            .json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.header("x-api-key", api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
            warn!(status = status.as_u16(), "inference endpoint returned an error");
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse =
            serde_json::from_str(&text).map_err(|e| InferenceError::Decode(e.to_string()))?;

        let completion: String = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        if completion.trim().is_empty() {
            return Err(InferenceError::EmptyCompletion {
                model: self.model.clone(),
            });
        }

        debug!(completion_chars = completion.len(), "completion received");
        Ok(completion)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn backend_name(&self) -> &'static str {
        "messages"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_wire_format() {
        let body = MessagesRequest {
            anthropic_version: "bedrock-2023-05-31",
            max_tokens: 4000,
            model: "claude",
            messages: [Message {
                role: "user",
                content: "review this",
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "anthropic_version": "bedrock-2023-05-31",
                "max_tokens": 4000,
                "model": "claude",
                "messages": [{"role": "user", "content": "review this"}]
            })
        );
    }

    #[test]
    fn response_ignores_non_text_blocks() {
        let parsed: MessagesResponse = serde_json::from_str(
            r#"{"content": [{"type": "thinking", "thinking": "..."}, {"type": "text", "text": "{}"}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.content.len(), 2);
        assert!(parsed.content[0].text.is_none());
        assert_eq!(parsed.content[1].text.as_deref(), Some("{}"));
    }
}
