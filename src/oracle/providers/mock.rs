//! Mock Model Provider
//!
//! Replays canned responses; used by tests and by the `mock` provider setting.

use crate::oracle::model::{GenerationConfig, ModelProvider, ModelResponse, ProviderKind, TokenUsage};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Placement every default mock reply carries
const DEFAULT_RESPONSE: &str = r#"{"center": [0.0, 0.0, 0.0], "rotation": [0.0, 0.0, 0.0]}"#;

/// Provider that answers from a fixed script
///
/// Responses are handed out in order; once the script runs out the last
/// response is repeated.
#[derive(Debug)]
pub struct MockProvider {
    responses: Mutex<VecDeque<String>>,
    last: Mutex<String>,
    model_name: String,
    system_message: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    /// Create a provider that always answers `response`
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_responses(vec![response.into()])
    }

    /// Create a provider that answers with `responses` in order
    pub fn with_responses(responses: Vec<String>) -> Self {
        let last = responses
            .last()
            .cloned()
            .unwrap_or_else(|| DEFAULT_RESPONSE.to_string());
        Self {
            responses: Mutex::new(responses.into()),
            last: Mutex::new(last),
            model_name: "mock-model".to_string(),
            system_message: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    pub fn with_system_message(mut self, message: impl Into<String>) -> Self {
        self.system_message = Some(message.into());
        self
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    fn next_response(&self) -> String {
        let next = self
            .responses
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front());
        match next {
            Some(response) => {
                if let Ok(mut last) = self.last.lock() {
                    *last = response.clone();
                }
                response
            }
            None => self
                .last
                .lock()
                .map(|last| last.clone())
                .unwrap_or_else(|_| DEFAULT_RESPONSE.to_string()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(DEFAULT_RESPONSE)
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    async fn generate(&self, prompt: &str, _config: &GenerationConfig) -> Result<ModelResponse> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let content = self.next_response();
        let prompt_tokens = prompt.split_whitespace().count() as u32;
        let completion_tokens = content.split_whitespace().count() as u32;

        Ok(ModelResponse {
            content,
            model: self.model_name.clone(),
            usage: Some(TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            }),
            finish_reason: Some("stop".to_string()),
            reasoning: None,
        })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Mock
    }

    fn system_message(&self) -> Option<&str> {
        self.system_message.as_deref()
    }
}
