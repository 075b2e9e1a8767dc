//! # Pagesmith Config
//!
//! The single persisted LLM configuration record: schema, TOML store,
//! validation and change notification.

mod error;
mod schema;
mod store;
mod validator;
mod watcher;

pub use error::ConfigError;
pub use schema::{ConfigPatch, LlmConfig, ProviderKind, StoreFile};
pub use store::{ConfigStore, CONFIG_KEY};
pub use validator::{ConfigIssue, ConfigValidator, Severity};
pub use watcher::ConfigWatcher;
