//! # Pagesmith Client
//!
//! Turns an [`LlmRequest`](pagesmith_protocols::LlmRequest) into one HTTP
//! round trip against the configured provider and interprets the answer.

mod client;
mod prompt;
mod reply;

pub use client::{strategy_for, LlmClient, REQUEST_TIMEOUT};
pub use prompt::{build_prompt, truncate_html, HTML_TRUNCATION_LIMIT, TRUNCATION_MARKER};
pub use reply::interpret;
