//! The file index: every scope's tree plus the global version registry.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tracing::{debug, info, warn};

use trove_core::config::index::IndexConfig;
use trove_core::error::{AppError, ErrorKind};
use trove_core::result::AppResult;
use trove_core::types::{ActorId, ScopeId, VersionId};
use trove_entity::path::NormalizedPath;
use trove_entity::version::{LocationDescriptor, Version, VersionMetadata};

use crate::locks::KeyedLocks;
use crate::node::{Lookup, TreeNode};
use crate::record::FileRecord;
use crate::tree::FileTree;

/// How many times an upload retries when the record it found was deleted
/// between lookup and append.
const UPLOAD_ATTEMPTS: usize = 3;

/// Result of [`FileIndex::record_upload`].
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// The record now holding the version.
    pub record: Arc<FileRecord>,
    /// The appended version.
    pub version: Version,
    /// Whether the record was created by this upload.
    pub created: bool,
}

/// In-process index of file records across scopes.
///
/// Owned by the storage-metadata service and shared through `Arc`. All
/// tree mutation goes through get-or-create, which is serialized per
/// `(scope, path)`.
#[derive(Debug)]
pub struct FileIndex {
    pub(crate) scopes: DashMap<ScopeId, Arc<FileTree>>,
    pub(crate) versions: DashMap<VersionId, Arc<FileRecord>>,
    locks: KeyedLocks<(ScopeId, NormalizedPath)>,
    lock_timeout: Duration,
}

impl FileIndex {
    /// Create an empty index.
    pub fn new(config: &IndexConfig) -> Self {
        Self::with_lock_timeout(config.lock_timeout())
    }

    /// Create an empty index with an explicit lock timeout.
    pub fn with_lock_timeout(lock_timeout: Duration) -> Self {
        Self {
            scopes: DashMap::new(),
            versions: DashMap::new(),
            locks: KeyedLocks::new(),
            lock_timeout,
        }
    }

    /// The tree of a scope, if it has one.
    pub fn scope(&self, scope_id: ScopeId) -> Option<Arc<FileTree>> {
        self.scopes.get(&scope_id).map(|tree| Arc::clone(tree.value()))
    }

    /// The tree of a scope, created empty on first use.
    pub fn open_scope(&self, scope_id: ScopeId) -> Arc<FileTree> {
        Arc::clone(
            self.scopes
                .entry(scope_id)
                .or_insert_with(|| {
                    debug!(scope_id = %scope_id, "Scope tree created");
                    Arc::new(FileTree::new(scope_id))
                })
                .value(),
        )
    }

    /// Every scope with a tree, in id order.
    pub fn scope_ids(&self) -> Vec<ScopeId> {
        let mut ids: Vec<ScopeId> = self.scopes.iter().map(|entry| *entry.key()).collect();
        ids.sort();
        ids
    }

    /// Resolve a path within a scope. A scope without a tree behaves like
    /// an empty one.
    pub fn find_by_path(&self, scope_id: ScopeId, path: &NormalizedPath) -> Lookup {
        match self.scope(scope_id) {
            Some(tree) => tree.find_by_path(path),
            None if path.is_root() => {
                Lookup::Found(TreeNode::Directory(FileTree::new(scope_id).root().clone()))
            }
            None => Lookup::Missing { at: path.prefix(1) },
        }
    }

    /// Return the live record at `path`, creating an empty one if absent.
    ///
    /// Linearizable per `(scope, path)`: of N concurrent callers exactly one
    /// sees `created == true` and all receive the same record. A
    /// soft-deleted leaf is replaced by a fresh record.
    pub async fn get_or_create(
        &self,
        scope_id: ScopeId,
        path: &NormalizedPath,
    ) -> AppResult<(Arc<FileRecord>, bool)> {
        if path.is_root() {
            return Err(AppError::bad_request("A file path must not be empty"));
        }
        let _guard = self
            .locks
            .acquire((scope_id, path.clone()), self.lock_timeout)
            .await?;

        let tree = self.open_scope(scope_id);
        tree.insert_record_if_absent(path, || {
            Ok(Arc::new(FileRecord::new(scope_id, path.clone())))
        })
    }

    /// Append a version to a record and register its id globally.
    ///
    /// Fails with `Gone` when the record is deleted.
    pub fn create_version(
        &self,
        record: &Arc<FileRecord>,
        actor: ActorId,
        location: LocationDescriptor,
        metadata: VersionMetadata,
    ) -> AppResult<Version> {
        let version = record.append_version(actor, location, metadata)?;
        self.versions.insert(version.id, Arc::clone(record));
        info!(
            scope_id = %record.scope_id(),
            path = %record.path(),
            version_id = %version.id,
            actor_id = %actor,
            "Version created"
        );
        Ok(version)
    }

    /// Store an uploaded version at `path`, creating the record if needed.
    ///
    /// Get-or-create and the append run under the same per-path lock, and
    /// a new record only becomes visible in the tree once it holds its
    /// first version.
    pub async fn record_upload(
        &self,
        scope_id: ScopeId,
        path: &NormalizedPath,
        actor: ActorId,
        location: LocationDescriptor,
        metadata: VersionMetadata,
    ) -> AppResult<UploadOutcome> {
        if path.is_root() {
            return Err(AppError::bad_request("A file path must not be empty"));
        }
        let _guard = self
            .locks
            .acquire((scope_id, path.clone()), self.lock_timeout)
            .await?;
        let tree = self.open_scope(scope_id);

        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut first = None;
            let (record, created) = tree.insert_record_if_absent(path, || {
                let record = Arc::new(FileRecord::new(scope_id, path.clone()));
                first = Some(record.append_version(actor, location.clone(), metadata.clone())?);
                Ok(record)
            })?;

            let version = match first {
                Some(version) => version,
                None => match record.append_version(actor, location.clone(), metadata.clone()) {
                    Ok(version) => version,
                    Err(err) if err.is(ErrorKind::Gone) && attempt < UPLOAD_ATTEMPTS => {
                        debug!(scope_id = %scope_id, path = %path, attempt, "Record deleted during upload, retrying");
                        continue;
                    }
                    Err(err) => return Err(err),
                },
            };

            self.versions.insert(version.id, Arc::clone(&record));
            info!(
                scope_id = %scope_id,
                path = %path,
                version_id = %version.id,
                actor_id = %actor,
                created,
                "Upload recorded"
            );
            return Ok(UploadOutcome {
                record,
                version,
                created,
            });
        }
    }

    /// Merge confirmed metadata into a version found by its global id.
    ///
    /// `NotFound` if no reachable record holds the id; `Conflict` if the
    /// version was already confirmed.
    pub fn update_metadata(
        &self,
        version_id: VersionId,
        metadata: VersionMetadata,
    ) -> AppResult<Version> {
        let record = self
            .versions
            .get(&version_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| AppError::not_found(format!("Version {version_id} not found")))?;
        let version = record.confirm_version(version_id, metadata)?;
        info!(version_id = %version_id, path = %record.path(), "Version metadata confirmed");
        Ok(version)
    }

    /// Find a version anywhere in the index, with its record and index.
    pub fn find_version(&self, version_id: VersionId) -> Option<(Arc<FileRecord>, usize, Version)> {
        let record = self
            .versions
            .get(&version_id)
            .map(|entry| Arc::clone(entry.value()))?;
        let (index, version) = record.find_version(version_id)?;
        Some((record, index, version))
    }

    /// Number of registered versions across all scopes.
    pub fn version_count(&self) -> usize {
        self.versions.len()
    }

    /// Soft-delete a record, honoring its scope's policy.
    pub fn delete(&self, record: &FileRecord, actor: ActorId) -> AppResult<()> {
        match self.scope(record.scope_id()) {
            Some(tree) => tree.delete_record(record, actor),
            None => record.mark_deleted(actor),
        }
    }

    /// Soft-delete the record at `path`.
    pub fn delete_path(
        &self,
        scope_id: ScopeId,
        path: &NormalizedPath,
        actor: ActorId,
    ) -> AppResult<Arc<FileRecord>> {
        let record = self.record(scope_id, path)?;
        self.delete(&record, actor)?;
        Ok(record)
    }

    /// Mark a scope as a frozen registration.
    pub fn freeze_scope(&self, scope_id: ScopeId) {
        self.open_scope(scope_id).freeze();
        info!(scope_id = %scope_id, "Scope frozen");
    }

    /// Live children of a directory, sorted by name.
    ///
    /// The root of a scope with no tree lists as empty. A missing non-root
    /// path is `NotFound`; a file path is `BadRequest`.
    pub fn list_children(
        &self,
        scope_id: ScopeId,
        path: &NormalizedPath,
    ) -> AppResult<Vec<TreeNode>> {
        let Some(tree) = self.scope(scope_id) else {
            if path.is_root() {
                return Ok(Vec::new());
            }
            return Err(AppError::not_found(format!("Folder '{path}' not found")));
        };
        match tree.find_by_path(path) {
            Lookup::Found(TreeNode::Directory(dir)) => Ok(tree.live_children(&dir)),
            Lookup::Found(TreeNode::File(_)) => Err(AppError::bad_request(format!(
                "'{path}' is a file, not a folder"
            ))),
            Lookup::Missing { at } => Err(AppError::not_found(format!(
                "Folder '{path}' not found at '{at}'"
            ))),
        }
    }

    /// The record at `path`, deleted or not.
    pub fn record(&self, scope_id: ScopeId, path: &NormalizedPath) -> AppResult<Arc<FileRecord>> {
        match self.find_by_path(scope_id, path) {
            Lookup::Found(TreeNode::File(record)) => Ok(record),
            Lookup::Found(TreeNode::Directory(_)) => Err(AppError::bad_request(format!(
                "'{path}' is a folder, not a file"
            ))),
            Lookup::Missing { at } => Err(AppError::not_found(format!(
                "File '{path}' not found at '{at}'"
            ))),
        }
    }

    /// The record at `path`, failing with `Gone` if it is deleted.
    pub fn live_record(
        &self,
        scope_id: ScopeId,
        path: &NormalizedPath,
    ) -> AppResult<Arc<FileRecord>> {
        let record = self.record(scope_id, path)?;
        if record.is_deleted() {
            warn!(scope_id = %scope_id, path = %path, "Read of deleted file");
            return Err(AppError::gone(format!("File '{path}' has been deleted")));
        }
        Ok(record)
    }
}
