//! Injectable key-value storage
//!
//! The session store and history log only ever talk to a [`StorageBackend`],
//! so the same logic runs against memory, files, or anything else that can
//! get, set and delete strings by key.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::error::StorageResult;

/// Durable string storage addressed by key
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read a value
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: String) -> StorageResult<()>;

    /// Remove a value; removing a missing key succeeds
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Every stored key starting with `prefix`, sorted
    async fn keys(&self, prefix: &str) -> StorageResult<Vec<String>>;
}

/// In-process storage, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> StorageResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        Ok(self
            .entries
            .read()
            .await
            .range(prefix.to_string()..)
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_round_trip() {
        let storage = MemoryStorage::new();
        assert!(storage.get("missing").await.unwrap().is_none());

        storage.set("a", "1".to_string()).await.unwrap();
        storage.set("a", "2".to_string()).await.unwrap();
        assert_eq!(storage.get("a").await.unwrap().as_deref(), Some("2"));

        storage.delete("a").await.unwrap();
        storage.delete("a").await.unwrap();
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_memory_prefix_scan() {
        let storage = MemoryStorage::new();
        for key in ["p:b", "p:a", "q:a", "p"] {
            storage.set(key, String::new()).await.unwrap();
        }

        assert_eq!(storage.keys("p:").await.unwrap(), vec!["p:a", "p:b"]);
        assert_eq!(storage.keys("").await.unwrap().len(), 4);
        assert_eq!(storage.len().await, 4);
    }
}
