//! Message routing errors.

use thiserror::Error;

/// Shown when a request is attempted on a browser-internal page.
pub const RESTRICTED_PAGE_MESSAGE: &str = "Cannot use extension on Chrome internal pages. \
Please navigate to a regular website (like google.com) and try again.";

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Page agent unreachable: {0}")]
    Unreachable(String),

    #[error("Invalid {kind} payload: {message}")]
    InvalidPayload { kind: String, message: String },

    #[error("Unexpected reply: expected {expected}")]
    UnexpectedReply { expected: &'static str },

    #[error("Channel closed")]
    ChannelClosed,

    #[error("No active tab")]
    NoActiveTab,

    #[error("{}", RESTRICTED_PAGE_MESSAGE)]
    RestrictedPage(String),

    #[error("Please configure your LLM settings first")]
    NotConfigured,

    #[error("Please enter a request")]
    EmptyPrompt,

    #[error("Please fill in all required fields")]
    IncompleteConfig,

    #[error("Error saving configuration: {0}")]
    SaveFailed(String),

    #[error("Unknown quick action: {0}")]
    UnknownAction(String),

    #[error("{0}")]
    Remote(String),
}

impl RouterError {
    pub fn invalid_payload(kind: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidPayload {
            kind: kind.into(),
            message: message.to_string(),
        }
    }
}
