//! Scripted stand-in for the language model.

use async_trait::async_trait;
use contractguard_inference::{InferenceClient, InferenceError, InferenceResult};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One scripted reply.
#[derive(Clone, Debug)]
pub enum Reply {
    Text(String),
    /// Non-success HTTP status from the endpoint.
    Status(u16),
}

/// Returns queued replies in order and records every prompt it receives.
///
/// An exhausted script answers with an upstream 500.
#[derive(Default)]
pub struct ScriptedInference {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedInference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn push_text(&self, text: impl Into<String>) {
        self.push(Reply::Text(text.into()));
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl InferenceClient for ScriptedInference {
    async fn complete(&self, prompt: &str) -> InferenceResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Status(status)) => Err(InferenceError::Status {
                status,
                body: "scripted failure".to_string(),
            }),
            None => Err(InferenceError::Status {
                status: 500,
                body: "no scripted reply left".to_string(),
            }),
        }
    }

    fn model(&self) -> &str {
        "scripted"
    }

    fn backend_name(&self) -> &'static str {
        "scripted"
    }
}
