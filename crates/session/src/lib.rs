//! Durable state for interactive endpoint testing
//!
//! Per-endpoint test sessions and the bounded request history, both written
//! through an injectable [`StorageBackend`] so they survive restarts.

pub mod backend;
pub mod error;
pub mod export;
pub mod file;
pub mod history;
pub mod store;
pub mod types;

pub use backend::{MemoryStorage, StorageBackend};
pub use error::{StorageError, StorageResult};
pub use export::{export_entries, ExportFormat};
pub use file::FileStorage;
pub use history::{
    HistoryLimits, HistoryLog, DEFAULT_CAPACITY, DEFAULT_MAX_PERSISTED_BODY_CHARS, HISTORY_KEY,
    TRUNCATED_BODY_MARKER,
};
pub use store::{TestSessionStore, SESSION_NAMESPACE};
pub use types::{
    HistoryEntry, HistoryOutcome, RequestSnapshot, ResponseSnapshot, TestSessionRecord,
};
