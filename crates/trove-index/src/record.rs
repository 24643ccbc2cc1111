//! Shared, concurrently accessed file records.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use trove_core::error::AppError;
use trove_core::result::AppResult;
use trove_core::types::{ActorId, RecordId, ScopeId, VersionId};
use trove_entity::path::NormalizedPath;
use trove_entity::tree::RecordSnapshot;
use trove_entity::version::{LocationDescriptor, Version, VersionMetadata};

use crate::node::TouchStamp;

/// Mutable part of a record, guarded by one lock so that readers see
/// either the state before an append/delete or the state after it.
#[derive(Debug, Default)]
struct RecordState {
    name: Option<String>,
    versions: Vec<Version>,
    is_deleted: bool,
}

/// A file record: one path in one scope plus its append-only history.
///
/// Records are shared as `Arc<FileRecord>` between the tree, the version
/// registry and callers. Identity never changes; the version sequence only
/// grows.
#[derive(Debug)]
pub struct FileRecord {
    id: RecordId,
    scope_id: ScopeId,
    path: NormalizedPath,
    state: RwLock<RecordState>,
    touched: TouchStamp,
}

impl FileRecord {
    /// Create an empty record for a path.
    pub(crate) fn new(scope_id: ScopeId, path: NormalizedPath) -> Self {
        Self {
            id: RecordId::new(),
            scope_id,
            path,
            state: RwLock::new(RecordState::default()),
            touched: TouchStamp::default(),
        }
    }

    /// Rebuild a record from its persisted form.
    pub(crate) fn from_snapshot(scope_id: ScopeId, snapshot: RecordSnapshot) -> Self {
        Self {
            id: snapshot.id,
            scope_id,
            path: snapshot.path,
            state: RwLock::new(RecordState {
                name: Some(snapshot.name),
                versions: snapshot.versions,
                is_deleted: snapshot.is_deleted,
            }),
            touched: TouchStamp::default(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RecordState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RecordState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record identifier.
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Scope owning this record.
    pub fn scope_id(&self) -> ScopeId {
        self.scope_id
    }

    /// Normalized path.
    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    /// Display name: the stored name, else the last path segment.
    pub fn name(&self) -> String {
        self.read()
            .name
            .clone()
            .unwrap_or_else(|| self.path.name().unwrap_or_default().to_string())
    }

    /// Whether the record is soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.read().is_deleted
    }

    /// A record with no versions yet was created but never written to.
    pub fn is_pending(&self) -> bool {
        self.read().versions.is_empty()
    }

    /// Number of versions.
    pub fn version_count(&self) -> usize {
        self.read().versions.len()
    }

    /// A consistent copy of the version history, oldest first.
    pub fn versions(&self) -> Vec<Version> {
        self.read().versions.clone()
    }

    /// The version at a one-based index.
    pub fn version(&self, index: usize) -> Option<Version> {
        let state = self.read();
        index
            .checked_sub(1)
            .and_then(|i| state.versions.get(i))
            .cloned()
    }

    /// The latest version and its one-based index.
    pub fn latest(&self) -> Option<(usize, Version)> {
        let state = self.read();
        state
            .versions
            .last()
            .map(|version| (state.versions.len(), version.clone()))
    }

    /// Find a version of this record by id, with its one-based index.
    pub fn find_version(&self, version_id: VersionId) -> Option<(usize, Version)> {
        let state = self.read();
        state
            .versions
            .iter()
            .position(|v| v.id == version_id)
            .map(|pos| (pos + 1, state.versions[pos].clone()))
    }

    /// Append a new version.
    ///
    /// Write permission is the caller's concern. A deleted record accepts
    /// no further versions and fails with `Gone`, appending nothing.
    pub fn append_version(
        &self,
        actor: ActorId,
        location: LocationDescriptor,
        metadata: VersionMetadata,
    ) -> AppResult<Version> {
        let mut state = self.write();
        if state.is_deleted {
            return Err(AppError::gone(format!(
                "File '{}' has been deleted",
                self.path
            )));
        }
        let version = Version::new(actor, location, metadata);
        if state.name.is_none() {
            state.name = self.path.name().map(str::to_string);
        }
        state.versions.push(version.clone());
        debug!(
            record_id = %self.id,
            version_id = %version.id,
            index = state.versions.len(),
            "Version appended"
        );
        Ok(version)
    }

    /// Merge confirmed metadata into one of this record's versions.
    pub fn confirm_version(
        &self,
        version_id: VersionId,
        metadata: VersionMetadata,
    ) -> AppResult<Version> {
        let mut state = self.write();
        let version = state
            .versions
            .iter_mut()
            .find(|v| v.id == version_id)
            .ok_or_else(|| AppError::not_found(format!("Version {version_id} not found")))?;
        version.confirm(metadata)?;
        Ok(version.clone())
    }

    /// Soft-delete the record.
    ///
    /// Versions are kept. Fails with `DeleteRejected` when the record is
    /// already deleted, leaving it untouched.
    pub fn mark_deleted(&self, actor: ActorId) -> AppResult<()> {
        let mut state = self.write();
        if state.is_deleted {
            return Err(AppError::delete_rejected(format!(
                "File '{}' is already deleted",
                self.path
            )));
        }
        state.is_deleted = true;
        info!(
            record_id = %self.id,
            actor_id = %actor,
            path = %self.path,
            versions = state.versions.len(),
            "File record deleted"
        );
        Ok(())
    }

    /// Update the staleness timestamp. Deleted records are left alone.
    pub fn touch(&self) -> bool {
        if self.is_deleted() {
            return false;
        }
        self.touched.touch();
        true
    }

    /// When the record was last touched by a listing.
    pub fn touched_at(&self) -> Option<DateTime<Utc>> {
        self.touched.get()
    }

    /// Persisted form of the record.
    pub fn snapshot(&self) -> RecordSnapshot {
        let state = self.read();
        RecordSnapshot {
            id: self.id,
            path: self.path.clone(),
            name: state
                .name
                .clone()
                .unwrap_or_else(|| self.path.name().unwrap_or_default().to_string()),
            is_deleted: state.is_deleted,
            versions: state.versions.clone(),
        }
    }
}
