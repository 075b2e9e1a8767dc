//! Configuration schema.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// LLM provider family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Anthropic,
    /// OpenAI-compatible API at a caller-supplied base URL.
    Custom,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "custom" => Ok(Self::Custom),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// The persisted LLM configuration record.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default, alias = "apiKey")]
    pub api_key: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, alias = "baseUrl", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl LlmConfig {
    pub fn new(provider: ProviderKind, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(Some(base_url.into()));
        self
    }

    /// Whether both credentials a request needs are present.
    pub fn is_complete(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.model.trim().is_empty()
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Copy of this config with the patch's fields laid over it.
    pub fn merged(&self, patch: &ConfigPatch) -> Self {
        let mut merged = self.clone();
        if let Some(provider) = patch.provider {
            merged.provider = provider;
        }
        if let Some(api_key) = &patch.api_key {
            merged.api_key = api_key.clone();
        }
        if let Some(model) = &patch.model {
            merged.model = model.clone();
        }
        if patch.base_url.is_some() {
            merged.base_url = normalize_base_url(patch.base_url.clone());
        }
        merged
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("has_api_key", &self.has_api_key())
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Partial update to an [`LlmConfig`].
///
/// `base_url: Some("")` clears the stored base URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPatch {
    pub provider: Option<ProviderKind>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

impl ConfigPatch {
    pub fn is_empty(&self) -> bool {
        self.provider.is_none()
            && self.api_key.is_none()
            && self.model.is_none()
            && self.base_url.is_none()
    }
}

/// Patch that turns any config into `config`. An absent base URL becomes
/// `Some("")` so merging clears it.
impl From<&LlmConfig> for ConfigPatch {
    fn from(config: &LlmConfig) -> Self {
        Self {
            provider: Some(config.provider),
            api_key: Some(config.api_key.clone()),
            model: Some(config.model.clone()),
            base_url: Some(config.base_url.clone().unwrap_or_default()),
        }
    }
}

/// On-disk layout of the store file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreFile {
    #[serde(rename = "llmConfig", default, skip_serializing_if = "Option::is_none")]
    pub llm_config: Option<LlmConfig>,
}

fn normalize_base_url(base_url: Option<String>) -> Option<String> {
    base_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
