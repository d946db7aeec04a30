//! Request history retention settings

use anyhow::{anyhow, Result};
use apiscope_session::{HistoryLimits, DEFAULT_CAPACITY, DEFAULT_MAX_PERSISTED_BODY_CHARS};
use serde::{Deserialize, Serialize};

/// History configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Number of entries kept before the oldest are evicted
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Response bodies longer than this many characters are replaced by a
    /// marker when persisted
    #[serde(default = "default_max_persisted_body_chars")]
    pub max_persisted_body_chars: usize,
}

impl HistoryConfig {
    /// Validate the history settings
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(anyhow!("history.capacity must be greater than zero"));
        }
        if self.max_persisted_body_chars == 0 {
            return Err(anyhow!(
                "history.max_persisted_body_chars must be greater than zero"
            ));
        }
        Ok(())
    }

    /// Retention limits for the history log
    pub fn limits(&self) -> HistoryLimits {
        HistoryLimits {
            capacity: self.capacity,
            max_persisted_body_chars: self.max_persisted_body_chars,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            max_persisted_body_chars: default_max_persisted_body_chars(),
        }
    }
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_max_persisted_body_chars() -> usize {
    DEFAULT_MAX_PERSISTED_BODY_CHARS
}
