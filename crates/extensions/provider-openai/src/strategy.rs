//! OpenAI strategy implementation.

use serde_json::Value;

use pagesmith_protocols::error::ProviderError;
use pagesmith_protocols::provider::{join_url, ProviderStrategy};

use crate::api::{ChatMessage, ChatRequest, ChatResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

/// OpenAI-shaped request/response strategy.
#[derive(Debug, Clone)]
pub struct OpenAiStrategy {
    id: &'static str,
    base_url: String,
}

impl OpenAiStrategy {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// OpenAI at a non-default base URL (proxy, gateway).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            id: "openai",
            base_url: base_url.into(),
        }
    }

    /// OpenAI-compatible API for the `custom` provider.
    pub fn compatible(base_url: impl Into<String>) -> Self {
        Self {
            id: "custom",
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for OpenAiStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderStrategy for OpenAiStrategy {
    fn id(&self) -> &str {
        self.id
    }

    fn endpoint(&self) -> String {
        join_url(&self.base_url, CHAT_COMPLETIONS_PATH)
    }

    fn build_body(&self, model: &str, prompt: &str) -> Result<Value, ProviderError> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(prompt.to_string()),
            }],
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        };
        serde_json::to_value(request).map_err(|e| ProviderError::InvalidRequest(e.to_string()))
    }

    fn parse_content(&self, body: Value) -> Result<String, ProviderError> {
        let response: ChatResponse = serde_json::from_value(body)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("response has no choices".to_string()))?;
        Ok(choice.message.content.unwrap_or_default())
    }
}

#[cfg(test)]
#[path = "strategy_tests.rs"]
mod tests;
