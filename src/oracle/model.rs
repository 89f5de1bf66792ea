//! Model Provider Abstraction
//!
//! The narrow text-in/text-out interface the LLM-backed oracle talks to.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Supported model providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Mock,
    #[cfg(feature = "ollama")]
    Ollama,
}

impl ProviderKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mock" => Some(ProviderKind::Mock),
            #[cfg(feature = "ollama")]
            "ollama" => Some(ProviderKind::Ollama),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Mock => "mock",
            #[cfg(feature = "ollama")]
            ProviderKind::Ollama => "ollama",
        }
    }
}

/// Sampling parameters for a generation request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub stop_sequences: Option<Vec<String>>,
    /// Ask the provider to constrain output to JSON where it can
    #[serde(default)]
    pub json_mode: bool,
}

/// Token accounting reported by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A completed generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    pub content: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
    pub finish_reason: Option<String>,
    /// Text the model emitted inside `<think>` blocks, if any
    pub reasoning: Option<String>,
}

#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Generate a single completion for `prompt`
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<ModelResponse>;

    fn kind(&self) -> ProviderKind;

    /// System message sent ahead of every prompt, if the provider has one
    fn system_message(&self) -> Option<&str> {
        None
    }
}

/// Split `<think>...</think>` reasoning from the visible answer
///
/// Returns `(reasoning, content)`. Without a think block the content is the
/// trimmed input and reasoning is `None`.
pub fn parse_thinking_tokens(raw: &str) -> (Option<String>, String) {
    let (Some(start), Some(end)) = (raw.find("<think>"), raw.find("</think>")) else {
        return (None, raw.trim().to_string());
    };
    if end < start {
        return (None, raw.trim().to_string());
    }

    let reasoning = raw[start + "<think>".len()..end].trim().to_string();
    let mut content = String::with_capacity(raw.len());
    content.push_str(&raw[..start]);
    content.push_str(&raw[end + "</think>".len()..]);

    let reasoning = if reasoning.is_empty() {
        None
    } else {
        Some(reasoning)
    };
    (reasoning, content.trim().to_string())
}
