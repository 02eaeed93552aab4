//! Optional `mixbom.json` settings for the product and report directories.
//!
//! The file is discovered by walking up from a start directory. Every key is
//! optional, and relative directories resolve against the file's own directory.

use crate::domain::{BomError, DEFAULT_TARGET_AMOUNT, validate_target_amount};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "mixbom.json";
pub const DEFAULT_PRODUCTS_DIR: &str = "products";
pub const DEFAULT_CALCULATIONS_DIR: &str = "calculation_requests";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct MixbomConfig {
    pub products_dir: PathBuf,
    pub calculations_dir: PathBuf,
    pub default_target_amount: f64,
}

impl Default for MixbomConfig {
    fn default() -> Self {
        Self {
            products_dir: PathBuf::from(DEFAULT_PRODUCTS_DIR),
            calculations_dir: PathBuf::from(DEFAULT_CALCULATIONS_DIR),
            default_target_amount: DEFAULT_TARGET_AMOUNT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid config '{}': {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

impl From<ConfigError> for BomError {
    fn from(error: ConfigError) -> Self {
        match &error {
            ConfigError::Read { .. } => BomError::io_system("IO.CONFIG_READ", error.to_string()),
            ConfigError::Parse { .. } | ConfigError::Invalid { .. } => {
                BomError::structural("INPUT.CONFIG", error.to_string())
            }
        }
    }
}

impl MixbomConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        validate_target_amount(config.default_target_amount).map_err(|error| {
            ConfigError::Invalid {
                path: path.to_path_buf(),
                message: format!("defaultTargetAmount: {}", error.message()),
            }
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolved_against(base))
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Joins relative directories onto `base`; absolute ones are kept.
    pub fn resolved_against(mut self, base: &Path) -> Self {
        self.products_dir = resolve_path(base, &self.products_dir);
        self.calculations_dir = resolve_path(base, &self.calculations_dir);
        self
    }
}

pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|candidate| candidate.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Loads the nearest config above `start`, or the defaults when none exists.
pub fn load_config(start: &Path) -> Result<MixbomConfig, ConfigError> {
    match find_config_file(start) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            MixbomConfig::from_path(path)
        }
        None => Ok(MixbomConfig::default()),
    }
}

pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
