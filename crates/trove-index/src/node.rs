//! Tree nodes: directories, leaves and lookup results.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use trove_entity::path::NormalizedPath;
use trove_entity::tree::EntryKind;

use crate::record::FileRecord;

/// Best-effort access timestamp in epoch milliseconds; 0 means never.
///
/// Concurrent touches may overwrite each other; only the value is shared.
#[derive(Debug, Default)]
pub(crate) struct TouchStamp(AtomicI64);

impl TouchStamp {
    pub(crate) fn touch(&self) {
        self.0.store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    pub(crate) fn get(&self) -> Option<DateTime<Utc>> {
        match self.0.load(Ordering::Relaxed) {
            0 => None,
            millis => DateTime::from_timestamp_millis(millis),
        }
    }
}

/// A directory in a scope's tree. Created implicitly, never removed.
#[derive(Debug)]
pub struct DirectoryNode {
    path: NormalizedPath,
    children: RwLock<HashMap<String, TreeNode>>,
    touched: TouchStamp,
}

impl DirectoryNode {
    pub(crate) fn new(path: NormalizedPath) -> Self {
        Self {
            path,
            children: RwLock::new(HashMap::new()),
            touched: TouchStamp::default(),
        }
    }

    pub(crate) fn children_read(&self) -> RwLockReadGuard<'_, HashMap<String, TreeNode>> {
        self.children.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn children_write(&self) -> RwLockWriteGuard<'_, HashMap<String, TreeNode>> {
        self.children.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Directory path (empty for the root).
    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    /// Directory name (empty for the root).
    pub fn name(&self) -> &str {
        self.path.name().unwrap_or_default()
    }

    /// A direct child by name.
    pub fn child(&self, name: &str) -> Option<TreeNode> {
        self.children_read().get(name).cloned()
    }

    /// Every direct child, deleted records included.
    pub fn children(&self) -> Vec<TreeNode> {
        self.children_read().values().cloned().collect()
    }

    /// Update the staleness timestamp.
    pub fn touch(&self) {
        self.touched.touch();
    }

    /// When the directory was last touched by a listing.
    pub fn touched_at(&self) -> Option<DateTime<Utc>> {
        self.touched.get()
    }
}

/// A node of the tree: a directory or a file record leaf.
#[derive(Debug, Clone)]
pub enum TreeNode {
    /// Intermediate directory.
    Directory(Arc<DirectoryNode>),
    /// File record.
    File(Arc<FileRecord>),
}

impl TreeNode {
    /// Node kind.
    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Directory(_) => EntryKind::Directory,
            Self::File(_) => EntryKind::File,
        }
    }

    /// Node name.
    pub fn name(&self) -> String {
        match self {
            Self::Directory(dir) => dir.name().to_string(),
            Self::File(record) => record.name(),
        }
    }

    /// Node path.
    pub fn path(&self) -> &NormalizedPath {
        match self {
            Self::Directory(dir) => dir.path(),
            Self::File(record) => record.path(),
        }
    }

    /// The record, if this is a leaf.
    pub fn as_record(&self) -> Option<&Arc<FileRecord>> {
        match self {
            Self::File(record) => Some(record),
            Self::Directory(_) => None,
        }
    }

    /// The directory, if this is one.
    pub fn as_directory(&self) -> Option<&Arc<DirectoryNode>> {
        match self {
            Self::Directory(dir) => Some(dir),
            Self::File(_) => None,
        }
    }

    /// Whether a listing should show this node: directories always,
    /// records only when live and holding at least one version.
    pub fn is_listable(&self) -> bool {
        match self {
            Self::Directory(_) => true,
            Self::File(record) => !record.is_deleted() && !record.is_pending(),
        }
    }

    /// Touch the node. Returns `false` for deleted records.
    pub fn touch(&self) -> bool {
        match self {
            Self::Directory(dir) => {
                dir.touch();
                true
            }
            Self::File(record) => record.touch(),
        }
    }
}

/// Outcome of a path lookup.
#[derive(Debug, Clone)]
pub enum Lookup {
    /// The path resolved; a record leaf may still be soft-deleted.
    Found(TreeNode),
    /// Resolution stopped at `at`, the first prefix of the path with no node.
    Missing {
        /// Deepest prefix that did not resolve.
        at: NormalizedPath,
    },
}

impl Lookup {
    /// The node, if found.
    pub fn found(self) -> Option<TreeNode> {
        match self {
            Self::Found(node) => Some(node),
            Self::Missing { .. } => None,
        }
    }

    /// Whether the path resolved.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The record, if the path resolved to a leaf.
    pub fn record(self) -> Option<Arc<FileRecord>> {
        match self {
            Self::Found(TreeNode::File(record)) => Some(record),
            _ => None,
        }
    }
}
