//! Storage backend settings

use anyhow::{anyhow, Result};
use apiscope_session::{FileStorage, MemoryStorage, StorageBackend};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Which backend holds sessions and history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Nothing survives the process
    Memory,

    /// One file per key under `data_dir`
    File,
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend kind
    #[serde(default = "default_backend")]
    pub backend: StorageKind,

    /// Data directory for the file backend; `~` and environment variables
    /// are expanded. Defaults to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
}

impl StorageConfig {
    /// Validate the storage settings
    pub fn validate(&self) -> Result<()> {
        if let Some(data_dir) = &self.data_dir {
            if data_dir.trim().is_empty() {
                return Err(anyhow!("storage.data_dir must not be empty"));
            }
        }
        Ok(())
    }

    /// Directory used by the file backend
    pub fn resolved_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(data_dir) => {
                let expanded = shellexpand::full(data_dir)
                    .map_err(|e| anyhow!("Failed to expand data_dir {}: {}", data_dir, e))?;
                Ok(PathBuf::from(expanded.as_ref()))
            }
            None => crate::utils::get_data_dir(),
        }
    }

    /// Open the configured backend
    pub fn open_backend(&self) -> Result<Arc<dyn StorageBackend>> {
        match self.backend {
            StorageKind::Memory => {
                debug!("Using in-memory storage");
                Ok(Arc::new(MemoryStorage::new()))
            }
            StorageKind::File => {
                let data_dir = self.resolved_data_dir()?;
                debug!("Using file storage at {:?}", data_dir);
                Ok(Arc::new(FileStorage::new(data_dir)))
            }
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            data_dir: None,
        }
    }
}

fn default_backend() -> StorageKind {
    StorageKind::File
}
