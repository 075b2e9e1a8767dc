//! LLM provider errors.
//!
//! Display strings are what a failed [`LlmResponse`](crate::LlmResponse)
//! carries back to the user.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider '{0}' requires a base URL")]
    MissingBaseUrl(String),

    #[error("API request failed: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("No response received from API: {0}")]
    Network(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Request setup error: {0}")]
    InvalidRequest(String),

    #[error("Failed to parse LLM response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_missing_base_url() {
        let err = ProviderError::MissingBaseUrl("custom".to_string());
        assert!(err.to_string().contains("base URL"));
    }

    #[test]
    fn test_provider_error_api_error() {
        let err = ProviderError::ApiError {
            status: 401,
            message: "{\"error\":\"bad key\"}".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API request failed: 401 - {\"error\":\"bad key\"}"
        );
    }

    #[test]
    fn test_provider_error_network() {
        let err = ProviderError::Network("Connection refused".to_string());
        assert!(err.to_string().starts_with("No response received from API"));
    }

    #[test]
    fn test_provider_error_timeout() {
        let err = ProviderError::Timeout(30);
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_provider_error_invalid_response() {
        let err = ProviderError::InvalidResponse("missing choices".to_string());
        assert!(err.to_string().contains("Failed to parse LLM response"));
    }

    #[test]
    fn test_provider_error_debug() {
        let err = ProviderError::InvalidRequest("bad header".to_string());
        assert!(format!("{:?}", err).contains("InvalidRequest"));
    }
}
