//! OpenAI chat-completions strategy for Pagesmith.
//!
//! Also serves the `custom` provider: any OpenAI-compatible API reachable at
//! a caller-supplied base URL.

mod api;
mod strategy;

pub use strategy::{OpenAiStrategy, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
