//! TOML-backed configuration store.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::schema::{LlmConfig, StoreFile};

/// Key the configuration record is stored under.
pub const CONFIG_KEY: &str = "llmConfig";

/// Reads and writes the configuration record in a TOML file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at a user-supplied path, expanding a leading `~`.
    pub fn from_path_str(path: &str) -> Self {
        Self::new(Self::expand_path(path))
    }

    /// `~/.pagesmith/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pagesmith")
            .join("config.toml")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored record. A missing file means nothing is configured yet.
    pub fn load(&self) -> Result<Option<LlmConfig>, ConfigError> {
        if !self.path.exists() {
            debug!("Config store not found at {}", self.path.display());
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        Self::load_str(&content)
    }

    /// Parse a store file body.
    pub fn load_str(content: &str) -> Result<Option<LlmConfig>, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let file: StoreFile = toml::from_str(&expanded)?;
        Ok(file.llm_config)
    }

    /// Replace the stored record.
    pub fn save(&self, config: &LlmConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = StoreFile {
            llm_config: Some(config.clone()),
        };
        let content = toml::to_string_pretty(&file)?;
        fs::write(&self.path, content)?;
        info!(
            "Saved {} (provider={}, model={})",
            CONFIG_KEY, config.provider, config.model
        );
        Ok(())
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        let mut result = content.to_string();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.pagesmith`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}
