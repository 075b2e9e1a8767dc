//! Checks run on an LLM config before it is saved or shown.

use std::fmt;

use crate::schema::{LlmConfig, ProviderKind};

/// Whether an issue blocks saving the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One problem with a config field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    /// Store key of the offending field, e.g. `llmConfig.baseUrl`.
    pub field: &'static str,
    pub message: String,
}

impl ConfigIssue {
    fn error(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field,
            message: message.into(),
        }
    }

    fn warning(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub struct ConfigValidator;

impl ConfigValidator {
    /// All issues found in `config`, errors before warnings for each field.
    pub fn validate(config: &LlmConfig) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if config.api_key.trim().is_empty() {
            issues.push(ConfigIssue::error("llmConfig.apiKey", "API key is required"));
        } else if config.api_key.trim() != config.api_key {
            issues.push(ConfigIssue::warning(
                "llmConfig.apiKey",
                "API key has leading or trailing whitespace",
            ));
        }

        if config.model.trim().is_empty() {
            issues.push(ConfigIssue::error("llmConfig.model", "Model is required"));
        }

        if let Some(issue) = base_url_issue(config) {
            issues.push(issue);
        }
        issues
    }

    /// Whether any issue blocks saving.
    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(ConfigIssue::is_error)
    }
}

fn base_url_issue(config: &LlmConfig) -> Option<ConfigIssue> {
    const FIELD: &str = "llmConfig.baseUrl";

    let Some(base_url) = config.base_url.as_deref() else {
        return (config.provider == ProviderKind::Custom)
            .then(|| ConfigIssue::error(FIELD, "Custom provider requires a base URL"));
    };

    let parsed = match url::Url::parse(base_url) {
        Ok(parsed) => parsed,
        Err(e) => return Some(ConfigIssue::error(FIELD, format!("Invalid URL: {}", e))),
    };
    match parsed.scheme() {
        "https" => None,
        "http" if is_loopback(&parsed) => None,
        "http" => Some(ConfigIssue::warning(
            FIELD,
            "Base URL uses plain HTTP; the API key is sent unencrypted",
        )),
        other => Some(ConfigIssue::error(
            FIELD,
            format!("Unsupported URL scheme: {}", other),
        )),
    }
}

fn is_loopback(url: &url::Url) -> bool {
    matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"))
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
