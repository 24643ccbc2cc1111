//! Per-scope file tree.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use trove_core::error::AppError;
use trove_core::result::AppResult;
use trove_core::types::{ActorId, ScopeId};
use trove_entity::path::NormalizedPath;

use crate::node::{DirectoryNode, Lookup, TreeNode};
use crate::record::FileRecord;

/// The directory tree of one scope.
///
/// Tree mutation happens in exactly one place,
/// [`FileTree::insert_record_if_absent`], which is only reached through
/// get-or-create on the owning index.
#[derive(Debug)]
pub struct FileTree {
    scope_id: ScopeId,
    root: Arc<DirectoryNode>,
    frozen: AtomicBool,
    retired: Mutex<Vec<Arc<FileRecord>>>,
}

impl FileTree {
    /// Create an empty tree.
    pub fn new(scope_id: ScopeId) -> Self {
        Self {
            scope_id,
            root: Arc::new(DirectoryNode::new(NormalizedPath::root())),
            frozen: AtomicBool::new(false),
            retired: Mutex::new(Vec::new()),
        }
    }

    /// The scope this tree belongs to.
    pub fn scope_id(&self) -> ScopeId {
        self.scope_id
    }

    /// The root directory.
    pub fn root(&self) -> &Arc<DirectoryNode> {
        &self.root
    }

    /// Mark the scope as a frozen registration; deletes are refused afterwards.
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::SeqCst);
    }

    pub(crate) fn set_frozen(&self, frozen: bool) {
        self.frozen.store(frozen, Ordering::SeqCst);
    }

    /// Whether the scope is frozen.
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::SeqCst)
    }

    /// Deleted records that were superseded by a newer record at their path.
    pub fn retired(&self) -> Vec<Arc<FileRecord>> {
        self.retired
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn retire(&self, record: Arc<FileRecord>) {
        self.retired
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    /// Resolve a path one segment at a time.
    ///
    /// The empty path is the root. A missing segment, or a segment that
    /// tries to descend through a file, yields [`Lookup::Missing`] carrying
    /// the prefix at which resolution stopped.
    pub fn find_by_path(&self, path: &NormalizedPath) -> Lookup {
        let mut current = TreeNode::Directory(Arc::clone(&self.root));
        for (depth, segment) in path.segments().enumerate() {
            let next = match &current {
                TreeNode::Directory(dir) => dir.child(segment),
                TreeNode::File(_) => None,
            };
            match next {
                Some(node) => current = node,
                None => {
                    let at = path.prefix(depth + 1);
                    debug!(scope_id = %self.scope_id, path = %path, missing_at = %at, "Path not found");
                    return Lookup::Missing { at };
                }
            }
        }
        Lookup::Found(current)
    }

    /// Make sure every directory along `dir_path` exists and return the last one.
    ///
    /// Fails with `Conflict` if a segment is already taken by a file.
    pub(crate) fn ensure_directories(
        &self,
        dir_path: &NormalizedPath,
    ) -> AppResult<Arc<DirectoryNode>> {
        let mut current = Arc::clone(&self.root);
        for (depth, segment) in dir_path.segments().enumerate() {
            let next = {
                let mut children = current.children_write();
                match children.get(segment) {
                    Some(TreeNode::Directory(dir)) => Arc::clone(dir),
                    Some(TreeNode::File(record)) => {
                        return Err(AppError::conflict(format!(
                            "'{}' is a file, not a directory",
                            record.path()
                        )));
                    }
                    None => {
                        let dir = Arc::new(DirectoryNode::new(dir_path.prefix(depth + 1)));
                        children.insert(segment.to_string(), TreeNode::Directory(Arc::clone(&dir)));
                        debug!(scope_id = %self.scope_id, path = %dir.path(), "Directory created");
                        dir
                    }
                }
            };
            current = next;
        }
        Ok(current)
    }

    /// Insert a record at `path` unless a live one is already there.
    ///
    /// `make` is only called when a new record is needed. A soft-deleted
    /// record in the way is retired and replaced. Returns the record at the
    /// path and whether it was created by this call.
    pub(crate) fn insert_record_if_absent<F>(
        &self,
        path: &NormalizedPath,
        make: F,
    ) -> AppResult<(Arc<FileRecord>, bool)>
    where
        F: FnOnce() -> AppResult<Arc<FileRecord>>,
    {
        let name = path
            .name()
            .ok_or_else(|| AppError::bad_request("A file path must not be empty"))?;
        let parent = self.ensure_directories(&path.parent())?;

        let mut children = parent.children_write();
        match children.get(name) {
            Some(TreeNode::File(existing)) if !existing.is_deleted() => {
                Ok((Arc::clone(existing), false))
            }
            Some(TreeNode::Directory(_)) => Err(AppError::conflict(format!(
                "'{path}' is a directory, not a file"
            ))),
            Some(TreeNode::File(deleted)) => {
                let deleted = Arc::clone(deleted);
                let record = make()?;
                children.insert(name.to_string(), TreeNode::File(Arc::clone(&record)));
                drop(children);
                info!(
                    scope_id = %self.scope_id,
                    path = %path,
                    retired_id = %deleted.id(),
                    record_id = %record.id(),
                    "Deleted record superseded"
                );
                self.retire(deleted);
                Ok((record, true))
            }
            None => {
                let record = make()?;
                children.insert(name.to_string(), TreeNode::File(Arc::clone(&record)));
                info!(scope_id = %self.scope_id, path = %path, record_id = %record.id(), "File record created");
                Ok((record, true))
            }
        }
    }

    /// Place a rebuilt record into the tree, used when importing snapshots.
    pub(crate) fn attach(&self, record: Arc<FileRecord>) -> AppResult<()> {
        let name = record
            .path()
            .name()
            .ok_or_else(|| AppError::bad_request("A file path must not be empty"))?
            .to_string();
        let parent = self.ensure_directories(&record.path().parent())?;
        let mut children = parent.children_write();
        if children.contains_key(&name) {
            return Err(AppError::conflict(format!(
                "Duplicate entry at '{}'",
                record.path()
            )));
        }
        children.insert(name, TreeNode::File(record));
        Ok(())
    }

    /// Soft-delete a record of this scope.
    ///
    /// Refused with `DeleteRejected` when the scope is frozen or the record
    /// is already deleted; state is unchanged in both cases.
    pub fn delete_record(&self, record: &FileRecord, actor: ActorId) -> AppResult<()> {
        if self.is_frozen() {
            warn!(scope_id = %self.scope_id, path = %record.path(), "Delete refused on frozen scope");
            return Err(AppError::delete_rejected(format!(
                "Scope {} is a registration and cannot be modified",
                self.scope_id
            )));
        }
        record.mark_deleted(actor).inspect_err(|_| {
            warn!(scope_id = %self.scope_id, path = %record.path(), "Delete refused, already deleted");
        })
    }

    /// Live children of a directory node, touching each listed child.
    pub fn live_children(&self, dir: &DirectoryNode) -> Vec<TreeNode> {
        let mut live: Vec<TreeNode> = dir
            .children()
            .into_iter()
            .filter(|child| child.touch() && child.is_listable())
            .collect();
        live.sort_by_key(|child| child.name());
        live
    }
}
