//! File-backed storage
//!
//! One JSON envelope per key, named by the SHA-256 of the key so arbitrary
//! keys (paths, colons, braces) map to safe file names.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::backend::StorageBackend;
use crate::error::StorageResult;

const ENTRY_EXTENSION: &str = "json";

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    key: String,
    value: String,
}

/// Storage rooted at a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Create storage rooted at `root`; the directory is created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        self.root
            .join(format!("{}.{ENTRY_EXTENSION}", hex::encode(hasher.finalize())))
    }

    async fn read_envelope(path: &Path) -> StorageResult<Option<Envelope>> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl StorageBackend for FileStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(Self::read_envelope(&self.entry_path(key))
            .await?
            .map(|envelope| envelope.value))
    }

    async fn set(&self, key: &str, value: String) -> StorageResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.entry_path(key);
        let staging = path.with_extension("tmp");
        let content = serde_json::to_string(&Envelope {
            key: key.to_string(),
            value,
        })?;

        tokio::fs::write(&staging, content).await?;
        tokio::fs::rename(&staging, &path).await?;

        debug!("Stored {} in {:?}", key, path);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        match tokio::fs::remove_file(self.entry_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }

            match Self::read_envelope(&path).await {
                Ok(Some(envelope)) if envelope.key.starts_with(prefix) => keys.push(envelope.key),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable storage entry {:?}: {}", path, e),
            }
        }

        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().join("store"));

        assert!(storage.get("GET:/users/{id}").await.unwrap().is_none());
        assert!(storage.keys("").await.unwrap().is_empty());

        storage
            .set("GET:/users/{id}", "first".to_string())
            .await
            .unwrap();
        storage
            .set("GET:/users/{id}", "second".to_string())
            .await
            .unwrap();

        assert_eq!(
            storage.get("GET:/users/{id}").await.unwrap().as_deref(),
            Some("second")
        );

        storage.delete("GET:/users/{id}").await.unwrap();
        storage.delete("GET:/users/{id}").await.unwrap();
        assert!(storage.get("GET:/users/{id}").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_keys_by_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        for key in ["s:b", "s:a", "t:a"] {
            storage.set(key, "{}".to_string()).await.unwrap();
        }
        std::fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(storage.keys("s:").await.unwrap(), vec!["s:a", "s:b"]);
    }

    #[tokio::test]
    async fn test_file_storage_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        FileStorage::new(temp_dir.path())
            .set("history:entries", "[]".to_string())
            .await
            .unwrap();

        let reopened = FileStorage::new(temp_dir.path());
        assert_eq!(
            reopened.get("history:entries").await.unwrap().as_deref(),
            Some("[]")
        );
    }
}
