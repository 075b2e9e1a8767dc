//! Anthropic strategy implementation.

use serde_json::Value;

use pagesmith_protocols::error::ProviderError;
use pagesmith_protocols::provider::{join_url, ProviderStrategy};

use crate::api::{ApiMessage, ContentBlock, MessagesRequest, MessagesResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const API_VERSION: &str = "2023-06-01";

const MESSAGES_PATH: &str = "messages";

/// Anthropic-shaped request/response strategy.
#[derive(Debug, Clone)]
pub struct AnthropicStrategy {
    base_url: String,
}

impl AnthropicStrategy {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for AnthropicStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderStrategy for AnthropicStrategy {
    fn id(&self) -> &str {
        "anthropic"
    }

    fn endpoint(&self) -> String {
        join_url(&self.base_url, MESSAGES_PATH)
    }

    fn build_body(&self, model: &str, prompt: &str) -> Result<Value, ProviderError> {
        let request = MessagesRequest {
            model: model.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            messages: vec![ApiMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };
        serde_json::to_value(request).map_err(|e| ProviderError::InvalidRequest(e.to_string()))
    }

    fn parse_content(&self, body: Value) -> Result<String, ProviderError> {
        let response: MessagesResponse = serde_json::from_value(body)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        response
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .ok_or_else(|| ProviderError::InvalidResponse("response has no text block".to_string()))
    }

    fn extra_headers(&self, api_key: &str) -> Vec<(&'static str, String)> {
        vec![
            ("x-api-key", api_key.to_string()),
            ("anthropic-version", API_VERSION.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint() {
        let strategy = AnthropicStrategy::new();
        assert_eq!(strategy.id(), "anthropic");
        assert_eq!(strategy.endpoint(), "https://api.anthropic.com/v1/messages");
    }

    #[test]
    fn test_custom_base_url() {
        let strategy = AnthropicStrategy::with_base_url("http://127.0.0.1:9000/v1");
        assert_eq!(strategy.endpoint(), "http://127.0.0.1:9000/v1/messages");
    }

    #[test]
    fn test_build_body_shape() {
        let body = AnthropicStrategy::new().build_body("claude-3-haiku-20240307", "Say hi").unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "claude-3-haiku-20240307",
                "max_tokens": 2000,
                "messages": [{"role": "user", "content": "Say hi"}]
            })
        );
    }

    #[test]
    fn test_parse_content() {
        let body = serde_json::json!({"content": [{"type": "text", "text": "hi"}]});
        assert_eq!(AnthropicStrategy::new().parse_content(body).unwrap(), "hi");
    }

    #[test]
    fn test_parse_content_skips_non_text_blocks() {
        let body = serde_json::json!({"content": [
            {"type": "thinking", "thinking": "hmm"},
            {"type": "text", "text": "answer"}
        ]});
        assert_eq!(AnthropicStrategy::new().parse_content(body).unwrap(), "answer");
    }

    #[test]
    fn test_parse_content_empty() {
        let body = serde_json::json!({"content": []});
        let err = AnthropicStrategy::new().parse_content(body).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_content_openai_shape_rejected() {
        let body = serde_json::json!({"choices": [{"message": {"content": "hi"}}]});
        assert!(AnthropicStrategy::new().parse_content(body).is_err());
    }

    #[test]
    fn test_extra_headers() {
        let headers = AnthropicStrategy::new().extra_headers("sk-ant");
        assert!(headers.contains(&("x-api-key", "sk-ant".to_string())));
        assert!(headers.iter().any(|(name, _)| *name == "anthropic-version"));
    }
}
