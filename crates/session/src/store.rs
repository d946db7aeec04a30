//! Test-session persistence
//!
//! Keeps the last-used inputs and response per `(spec source, endpoint)`.
//! Records are replaced whole; there is no field-level merge. Coalescing rapid
//! edits before calling [`TestSessionStore::save`] is the caller's job.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::backend::StorageBackend;
use crate::error::StorageResult;
use crate::types::TestSessionRecord;

/// Key namespace for session records
pub const SESSION_NAMESPACE: &str = "test-session";

/// Per-endpoint test session store
#[derive(Clone)]
pub struct TestSessionStore {
    backend: Arc<dyn StorageBackend>,
}

impl TestSessionStore {
    /// Create a store over a storage backend
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Upsert the record for `(spec_source_id, endpoint_key)`; last write wins
    pub async fn save(
        &self,
        spec_source_id: &str,
        endpoint_key: &str,
        record: &TestSessionRecord,
    ) -> StorageResult<()> {
        let content = serde_json::to_string(record)?;
        self.backend
            .set(&record_key(spec_source_id, endpoint_key), content)
            .await?;

        debug!("Saved test session {} for {}", endpoint_key, spec_source_id);
        Ok(())
    }

    /// Load the saved record, if one exists.
    ///
    /// A stored record that no longer deserializes reads as absent so the
    /// caller falls back to fresh example data.
    pub async fn load(
        &self,
        spec_source_id: &str,
        endpoint_key: &str,
    ) -> StorageResult<Option<TestSessionRecord>> {
        let Some(content) = self
            .backend
            .get(&record_key(spec_source_id, endpoint_key))
            .await?
        else {
            return Ok(None);
        };

        match serde_json::from_str(&content) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!(
                    "Ignoring unreadable test session {} for {}: {}",
                    endpoint_key, spec_source_id, e
                );
                Ok(None)
            }
        }
    }

    /// Remove exactly one record
    pub async fn clear_one(&self, spec_source_id: &str, endpoint_key: &str) -> StorageResult<()> {
        self.backend
            .delete(&record_key(spec_source_id, endpoint_key))
            .await
    }

    /// Remove every record of a spec source, returning how many were removed
    pub async fn clear_all_for_source(&self, spec_source_id: &str) -> StorageResult<usize> {
        let keys = self.backend.keys(&source_prefix(spec_source_id)).await?;
        for key in &keys {
            self.backend.delete(key).await?;
        }

        info!(
            "Cleared {} test session(s) for spec source {}",
            keys.len(),
            spec_source_id
        );
        Ok(keys.len())
    }

    /// Endpoint keys with a saved record for a spec source
    pub async fn endpoint_keys(&self, spec_source_id: &str) -> StorageResult<Vec<String>> {
        let prefix = source_prefix(spec_source_id);
        Ok(self
            .backend
            .keys(&prefix)
            .await?
            .into_iter()
            .filter_map(|key| key.strip_prefix(&prefix).map(str::to_string))
            .collect())
    }
}

/// Key prefix shared by every record of one spec source.
///
/// `%` and `:` in the source ID are escaped so that no source's prefix is a
/// prefix of another source's keys.
fn source_prefix(spec_source_id: &str) -> String {
    let escaped = spec_source_id.replace('%', "%25").replace(':', "%3A");
    format!("{SESSION_NAMESPACE}:{escaped}:")
}

fn record_key(spec_source_id: &str, endpoint_key: &str) -> String {
    format!("{}{}", source_prefix(spec_source_id), endpoint_key)
}
