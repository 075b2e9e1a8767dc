//! LLM client.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use pagesmith_config::{ConfigPatch, LlmConfig, ProviderKind};
use pagesmith_protocols::{LlmRequest, LlmResponse, ProviderError, ProviderStrategy};
use pagesmith_provider_anthropic::AnthropicStrategy;
use pagesmith_provider_openai::OpenAiStrategy;

use crate::prompt::build_prompt;
use crate::reply::interpret;

/// Transport timeout for one provider round trip.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Strategy for the configured provider.
///
/// `custom` needs a base URL; without one this fails before any I/O.
pub fn strategy_for(config: &LlmConfig) -> Result<Box<dyn ProviderStrategy>, ProviderError> {
    let base_url = config.base_url.as_deref();
    let strategy: Box<dyn ProviderStrategy> = match (config.provider, base_url) {
        (ProviderKind::OpenAi, None) => Box::new(OpenAiStrategy::new()),
        (ProviderKind::OpenAi, Some(url)) => Box::new(OpenAiStrategy::with_base_url(url)),
        (ProviderKind::Anthropic, None) => Box::new(AnthropicStrategy::new()),
        (ProviderKind::Anthropic, Some(url)) => Box::new(AnthropicStrategy::with_base_url(url)),
        (ProviderKind::Custom, Some(url)) => Box::new(OpenAiStrategy::compatible(url)),
        (ProviderKind::Custom, None) => {
            return Err(ProviderError::MissingBaseUrl(ProviderKind::Custom.to_string()));
        }
    };
    Ok(strategy)
}

/// Owns the configuration snapshot and the authorized HTTP transport.
///
/// Clones share the connection pool but reconfigure independently.
#[derive(Clone)]
pub struct LlmClient {
    config: LlmConfig,
    http: reqwest::Client,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self, ProviderError> {
        let http = Self::build_http(&config)?;
        info!(
            "LLM client ready (provider={}, model={}, has_api_key={})",
            config.provider,
            config.model,
            config.has_api_key()
        );
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Merge a partial configuration and rebuild the transport.
    ///
    /// On error the client keeps its previous configuration.
    pub fn update_config(&mut self, patch: &ConfigPatch) -> Result<(), ProviderError> {
        let config = self.config.merged(patch);
        self.http = Self::build_http(&config)?;
        self.config = config;
        info!("LLM client reconfigured (provider={})", self.config.provider);
        Ok(())
    }

    /// Single round trip to the provider. Every failure becomes a failed
    /// response.
    pub async fn process_request(&self, request: &LlmRequest) -> LlmResponse {
        match self.complete(request).await {
            Ok(raw) => {
                let reply = interpret(&raw);
                LlmResponse::from_reply(raw, reply)
            }
            Err(e) => {
                error!("LLM request failed: {}", e);
                LlmResponse::failure(e.to_string())
            }
        }
    }

    async fn complete(&self, request: &LlmRequest) -> Result<String, ProviderError> {
        let strategy = strategy_for(&self.config)?;
        let prompt = build_prompt(request);
        let body = strategy.build_body(&self.config.model, &prompt)?;
        let endpoint = strategy.endpoint();
        debug!(
            "Sending {} request to {} ({} prompt chars)",
            strategy.id(),
            endpoint,
            prompt.len()
        );

        let mut builder = self.http.post(&endpoint).json(&body);
        for (name, value) in strategy.extra_headers(&self.config.api_key) {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(map_transport_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Failed to read error body for status {}: {}", status, e);
                    String::new()
                }
            };
            return Err(ProviderError::ApiError { status, message: text });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        strategy.parse_content(body)
    }

    fn build_http(config: &LlmConfig) -> Result<reqwest::Client, ProviderError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| ProviderError::InvalidRequest(format!("invalid API key header: {}", e)))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| ProviderError::InvalidRequest(e.to_string()))
    }
}

fn map_transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(REQUEST_TIMEOUT.as_secs())
    } else if e.is_builder() {
        ProviderError::InvalidRequest(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
