//! DevTools connection errors.

use thiserror::Error;

use pagesmith_protocols::PageError;

#[derive(Debug, Error)]
pub enum CdpError {
    #[error("Browser not reachable at {0}. Start it with --remote-debugging-port=9222")]
    BrowserUnavailable(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("HTTP error: {0}")]
    Http(String),

    /// Error object returned by the browser for a command.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Exception thrown by evaluated page script.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    #[error("No page tab available")]
    NoPage,

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Session closed")]
    SessionClosed,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl CdpError {
    /// Whether the error means the browser link itself is gone.
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            Self::BrowserUnavailable(_) | Self::WebSocket(_) | Self::Http(_) | Self::SessionClosed
        )
    }

    /// Convert into a page read error.
    pub fn into_read(self) -> PageError {
        if self.is_connection() {
            PageError::Connection(self.to_string())
        } else {
            PageError::Read(self.to_string())
        }
    }

    /// Convert into a DOM mutation error.
    pub fn into_mutation(self) -> PageError {
        if self.is_connection() {
            PageError::Connection(self.to_string())
        } else {
            PageError::Mutation(self.to_string())
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<url::ParseError> for CdpError {
    fn from(e: url::ParseError) -> Self {
        CdpError::BrowserUnavailable(format!("invalid endpoint: {}", e))
    }
}
