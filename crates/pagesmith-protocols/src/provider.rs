//! Provider strategy trait.

use serde_json::Value;

use crate::error::ProviderError;

/// Request/response shape of one LLM HTTP API.
///
/// The client owns transport and authorization; a strategy only knows where
/// to post, what to post and where the text sits in the answer.
pub trait ProviderStrategy: Send + Sync {
    /// Identifier used in logs.
    fn id(&self) -> &str;

    /// Full URL the request is posted to.
    fn endpoint(&self) -> String;

    /// JSON body for a single user message.
    fn build_body(&self, model: &str, prompt: &str) -> Result<Value, ProviderError>;

    /// Extract the model text from a decoded response body.
    fn parse_content(&self, body: Value) -> Result<String, ProviderError>;

    /// Headers sent in addition to bearer authorization and content type.
    fn extra_headers(&self, _api_key: &str) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// Join a base URL and an endpoint path without doubling slashes.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
