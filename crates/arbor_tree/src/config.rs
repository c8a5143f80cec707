//! Shadow tree configuration
//!
//! Configuration can be built in code or loaded from TOML. Every key is
//! optional and falls back to its default:
//!
//! ```toml
//! max_commit_attempts = 1024
//! affected_nodes_capacity = 1024
//! log_commits = false
//! ```

use crate::error::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::path::Path;

/// Tunables of a [`crate::ShadowTree`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShadowTreeConfig {
    /// Attempts `commit` makes before declaring the tree corrupted
    pub max_commit_attempts: u32,
    /// Initial capacity of the per-commit affected-node list
    pub affected_nodes_capacity: usize,
    /// Log every successful commit at debug level
    pub log_commits: bool,
}

impl ShadowTreeConfig {
    pub const DEFAULT_MAX_COMMIT_ATTEMPTS: u32 = 1024;

    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: ShadowTreeConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&source)?;
        log::debug!("Loaded shadow tree config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_commit_attempts == 0 {
            return Err(ConfigError::Invalid("max_commit_attempts must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for ShadowTreeConfig {
    fn default() -> Self {
        Self {
            max_commit_attempts: Self::DEFAULT_MAX_COMMIT_ATTEMPTS,
            affected_nodes_capacity: 1024,
            log_commits: false,
        }
    }
}
