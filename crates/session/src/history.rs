//! Request history log
//!
//! Append-only, capacity-bounded record of executed requests. The oldest
//! entries (by insertion) are evicted first. Response bodies above the size
//! threshold are replaced by a marker in the persisted copy only; the
//! in-memory entries keep the full body.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::backend::StorageBackend;
use crate::error::StorageResult;
use crate::export::{export_entries, ExportFormat};
use crate::types::{HistoryEntry, HistoryOutcome};

/// Storage key of the persisted log
pub const HISTORY_KEY: &str = "history:entries";

/// Default number of retained entries
pub const DEFAULT_CAPACITY: usize = 200;

/// Default persisted response body limit, in characters
pub const DEFAULT_MAX_PERSISTED_BODY_CHARS: usize = 100_000;

/// Body stored in place of responses that exceed the persisted size limit
pub const TRUNCATED_BODY_MARKER: &str = "[response body too large to store in history]";

/// Retention policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLimits {
    /// Maximum number of entries kept
    pub capacity: usize,

    /// Bodies longer than this are not persisted verbatim
    pub max_persisted_body_chars: usize,
}

impl Default for HistoryLimits {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_persisted_body_chars: DEFAULT_MAX_PERSISTED_BODY_CHARS,
        }
    }
}

/// Bounded, ordered request history (oldest first)
pub struct HistoryLog {
    backend: Arc<dyn StorageBackend>,
    limits: HistoryLimits,
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    /// Open the log, loading whatever was persisted.
    ///
    /// An unreadable persisted log starts over empty.
    pub async fn open(
        backend: Arc<dyn StorageBackend>,
        limits: HistoryLimits,
    ) -> StorageResult<Self> {
        let mut entries: Vec<HistoryEntry> = match backend.get(HISTORY_KEY).await? {
            Some(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Discarding unreadable request history: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };

        if entries.len() > limits.capacity {
            let excess = entries.len() - limits.capacity;
            entries.drain(..excess);
        }

        debug!("Opened request history with {} entries", entries.len());
        Ok(Self {
            backend,
            limits,
            entries,
        })
    }

    /// Retention policy in effect
    pub fn limits(&self) -> HistoryLimits {
        self.limits
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// All entries, newest first
    pub fn newest_first(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().rev()
    }

    /// Entries belonging to one spec, oldest first
    pub fn for_spec(&self, spec_id: &str) -> Vec<&HistoryEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.spec_id == spec_id)
            .collect()
    }

    /// Look up an entry by ID
    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry, evicting the oldest beyond capacity
    pub async fn append(&mut self, entry: HistoryEntry) -> StorageResult<()> {
        let mut next = self.entries.clone();
        next.push(entry);

        let evicted = next.len().saturating_sub(self.limits.capacity);
        if evicted > 0 {
            next.drain(..evicted);
            debug!("Evicted {} history entries over capacity", evicted);
        }

        self.commit(next).await
    }

    /// Remove one entry; returns whether it existed
    pub async fn remove(&mut self, id: &str) -> StorageResult<bool> {
        if self.get(id).is_none() {
            return Ok(false);
        }

        let next = self
            .entries
            .iter()
            .filter(|entry| entry.id != id)
            .cloned()
            .collect();
        self.commit(next).await?;
        Ok(true)
    }

    /// Remove every entry
    pub async fn clear(&mut self) -> StorageResult<()> {
        self.commit(Vec::new()).await?;
        info!("Cleared request history");
        Ok(())
    }

    /// Remove every entry of one spec; returns how many were removed
    pub async fn clear_for_spec(&mut self, spec_id: &str) -> StorageResult<usize> {
        let next: Vec<HistoryEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.spec_id != spec_id)
            .cloned()
            .collect();
        let removed = self.entries.len() - next.len();

        self.commit(next).await?;
        info!("Cleared {} history entries for spec {}", removed, spec_id);
        Ok(removed)
    }

    /// Render the log, optionally restricted to one spec
    pub fn export(&self, format: ExportFormat, spec_id: Option<&str>) -> StorageResult<String> {
        let entries: Vec<&HistoryEntry> = match spec_id {
            Some(spec_id) => self.for_spec(spec_id),
            None => self.entries.iter().collect(),
        };
        export_entries(&entries, format)
    }

    /// Persist first, then swap in memory, so a failed write leaves the
    /// current entries untouched
    async fn commit(&mut self, next: Vec<HistoryEntry>) -> StorageResult<()> {
        let persisted: Vec<HistoryEntry> = next
            .iter()
            .map(|entry| persisted_form(entry, self.limits.max_persisted_body_chars))
            .collect();

        self.backend
            .set(HISTORY_KEY, serde_json::to_string(&persisted)?)
            .await?;

        self.entries = next;
        Ok(())
    }
}

/// Copy of an entry as written to storage
fn persisted_form(entry: &HistoryEntry, max_body_chars: usize) -> HistoryEntry {
    let mut persisted = entry.clone();
    if let HistoryOutcome::Response(response) = &mut persisted.outcome {
        if response.body.chars().count() > max_body_chars {
            response.body = TRUNCATED_BODY_MARKER.to_string();
        }
    }
    persisted
}
