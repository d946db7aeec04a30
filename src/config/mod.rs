//! Configuration management for apiscope

pub mod config;
pub mod history;
pub mod storage;


// Re-export main types for convenience
pub use config::{Config, CONFIG_VERSION, DEFAULT_CONFIG_PATHS};
pub use history::HistoryConfig;
pub use storage::{StorageConfig, StorageKind};
