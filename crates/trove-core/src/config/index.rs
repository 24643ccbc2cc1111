//! File index and revision listing configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the in-process file index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// How long get-or-create waits for the per-path lock, in milliseconds.
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout_ms: u64,
    /// Snapshot file loaded at startup and written by the CLI.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
}

impl IndexConfig {
    /// The lock timeout as a [`Duration`].
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout(),
            snapshot_path: default_snapshot_path(),
        }
    }
}

/// Settings for revision history listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionConfig {
    /// Revisions returned per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for RevisionConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_lock_timeout() -> u64 {
    5000
}

fn default_snapshot_path() -> String {
    "data/index.json".to_string()
}

fn default_page_size() -> usize {
    crate::types::pagination::DEFAULT_PAGE_SIZE
}
