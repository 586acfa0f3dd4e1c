//! Language model clients used to review contracts.
//!
//! Backends:
//! - `messages`: Anthropic messages request body over HTTP (Anthropic API,
//!   Bedrock gateways, local proxies)
//! - `openai`: any OpenAI-compatible chat completions endpoint

pub mod error;
pub mod messages;
pub mod openai;
pub mod traits;

pub use error::{InferenceError, InferenceResult};
pub use messages::MessagesClient;
pub use openai::OpenAiClient;
pub use traits::InferenceClient;

use contractguard_core::config::InferenceConfig;
use std::sync::Arc;
use std::time::Duration;

/// Create an inference client from configuration.
pub fn from_config(config: &InferenceConfig) -> InferenceResult<Arc<dyn InferenceClient>> {
    config.validate().map_err(InferenceError::Config)?;

    match config {
        InferenceConfig::Messages {
            endpoint,
            api_key,
            model,
            anthropic_version,
            max_tokens,
            timeout_secs,
        } => {
            let client = MessagesClient::new(
                endpoint,
                api_key.clone(),
                model,
                anthropic_version,
                *max_tokens,
                Duration::from_secs(*timeout_secs),
            )?;
            Ok(Arc::new(client))
        }
        InferenceConfig::OpenAi {
            api_base,
            api_key,
            model,
            max_tokens,
        } => Ok(Arc::new(OpenAiClient::new(
            api_base,
            api_key,
            model,
            *max_tokens,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_builds_each_backend() {
        let messages = from_config(&InferenceConfig::default()).unwrap();
        assert_eq!(messages.backend_name(), "messages");

        let openai = from_config(&InferenceConfig::OpenAi {
            api_base: "https://api.example.com/v1".to_string(),
            api_key: "sk-test".to_string(),
            model: "gpt-4o".to_string(),
            max_tokens: 4000,
        })
        .unwrap();
        assert_eq!(openai.backend_name(), "openai");
        assert_eq!(openai.model(), "gpt-4o");
    }

    #[test]
    fn from_config_rejects_zero_max_tokens() {
        let config = InferenceConfig::OpenAi {
            api_base: "https://api.example.com/v1".to_string(),
            api_key: "sk-test".to_string(),
            model: "gpt-4o".to_string(),
            max_tokens: 0,
        };
        assert!(matches!(from_config(&config), Err(InferenceError::Config(_))));
    }
}
