//! Scope policy and snapshot persistence.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use trove_core::result::AppResult;
use trove_core::types::ScopeId;
use trove_entity::tree::ScopeSnapshot;
use trove_index::FileIndex;

/// Freezes scopes and moves the index to and from its snapshot file.
#[derive(Debug, Clone)]
pub struct ScopeService {
    index: Arc<FileIndex>,
    snapshot_path: PathBuf,
}

impl ScopeService {
    /// Creates a new scope service persisting to `snapshot_path`.
    pub fn new(index: Arc<FileIndex>, snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            index,
            snapshot_path: snapshot_path.into(),
        }
    }

    /// The snapshot file.
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Turn a scope into a registration: its files can no longer be deleted.
    pub fn freeze(&self, scope_id: ScopeId) {
        self.index.freeze_scope(scope_id);
    }

    /// Whether a scope is frozen.
    pub fn is_frozen(&self, scope_id: ScopeId) -> bool {
        self.index
            .scope(scope_id)
            .is_some_and(|tree| tree.is_frozen())
    }

    /// Scopes known to the index.
    pub fn scopes(&self) -> Vec<ScopeId> {
        self.index.scope_ids()
    }

    /// Persisted form of one scope.
    pub fn export(&self, scope_id: ScopeId) -> AppResult<ScopeSnapshot> {
        self.index.export_scope(scope_id)
    }

    /// Load the snapshot file if it exists. Returns whether anything was loaded.
    pub async fn restore(&self) -> AppResult<bool> {
        if !tokio::fs::try_exists(&self.snapshot_path).await? {
            info!(path = %self.snapshot_path.display(), "No snapshot to restore");
            return Ok(false);
        }
        self.index.load_snapshot(&self.snapshot_path).await?;
        Ok(true)
    }

    /// Write the whole index to the snapshot file.
    pub async fn persist(&self) -> AppResult<()> {
        self.index.save_snapshot(&self.snapshot_path).await
    }
}
