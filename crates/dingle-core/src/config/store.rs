//! Config store for locating and loading dingle.json.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{ConfigValues, DingleConfig, parser};
use crate::error::{DingleError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "~/.dingle/dingle.json";

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Store for `path`, with a leading `~` expanded to the home directory.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            config_path: expand_tilde(path.as_ref()),
        }
    }

    pub fn with_defaults() -> Self {
        Self::from_path(DEFAULT_CONFIG_PATH)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Raw values, without checking required keys.
    pub fn load_values(&self) -> Result<ConfigValues> {
        if !self.config_path.exists() {
            return Err(DingleError::MissingConfigFile(self.config_path.clone()));
        }
        parser::parse_dingle_json(&self.config_path)
    }

    /// Load and validate the config.
    pub fn load(&self) -> Result<DingleConfig> {
        let config = self.load_values()?.validate()?;
        debug!("loaded config from {}", self.config_path.display());
        Ok(config)
    }
}

/// Expand a leading `~` or `~/` using the current user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
