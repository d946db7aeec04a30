//! Main configuration structure and implementation

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{HistoryConfig, StorageConfig};

/// Supported configuration version
pub const CONFIG_VERSION: &str = "1.0";

/// Files looked up, in order, when no configuration path is given
pub const DEFAULT_CONFIG_PATHS: [&str; 4] = [
    ".apiscope.yaml",
    ".apiscope.yml",
    "apiscope.yaml",
    "apiscope.yml",
];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// History retention
    #[serde(default)]
    pub history: HistoryConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {:?}", path))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the first default configuration file that exists, or the defaults
    pub fn discover() -> Result<Self> {
        match Self::find_default_path() {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// First existing default configuration path
    pub fn find_default_path() -> Option<PathBuf> {
        DEFAULT_CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.version != CONFIG_VERSION {
            return Err(anyhow!(
                "Unsupported configuration version: {}",
                self.version
            ));
        }

        self.storage.validate()?;
        self.history.validate()?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            storage: StorageConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}
