//! Anthropic messages-API strategy for Pagesmith.

mod api;
mod strategy;

pub use strategy::{AnthropicStrategy, API_VERSION, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS};
