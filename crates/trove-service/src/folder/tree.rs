//! Directory listings over a scope's file tree.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use trove_core::result::AppResult;
use trove_core::types::{RecordId, VersionId};
use trove_entity::path::NormalizedPath;
use trove_entity::tree::EntryKind;
use trove_index::{FileIndex, TreeNode};

use crate::context::RequestContext;

/// One listed child of a directory.
#[derive(Debug, Clone, Serialize)]
pub struct TreeEntry {
    /// Entry name.
    pub name: String,
    /// Path with a leading slash.
    pub path: String,
    /// Folder or file.
    pub kind: EntryKind,
    /// Record id, for files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,
    /// Latest version, for files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<VersionId>,
    /// Number of versions, for files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_count: Option<usize>,
    /// Latest size in bytes, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// When the latest version was uploaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

impl From<&TreeNode> for TreeEntry {
    fn from(node: &TreeNode) -> Self {
        let latest = node.as_record().and_then(|record| record.latest());
        Self {
            name: node.name(),
            path: node.path().display_path(),
            kind: node.kind(),
            record_id: node.as_record().map(|record| record.id()),
            latest_version: latest.as_ref().map(|(_, version)| version.id),
            version_count: latest.as_ref().map(|(count, _)| *count),
            size: latest.as_ref().and_then(|(_, version)| version.size()),
            modified: latest.as_ref().map(|(_, version)| version.created_at),
        }
    }
}

/// Lists directories.
#[derive(Debug, Clone)]
pub struct TreeService {
    index: Arc<FileIndex>,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(index: Arc<FileIndex>) -> Self {
        Self { index }
    }

    /// Live children of the directory at `path`, sorted by name.
    ///
    /// Listing touches every returned child. The root of an empty scope
    /// lists as empty; a missing folder is `NotFound`.
    pub fn list(&self, ctx: &RequestContext, path: &str) -> AppResult<Vec<TreeEntry>> {
        let path = NormalizedPath::parse(path)?;
        let children = self.index.list_children(ctx.scope_id, &path)?;
        debug!(scope_id = %ctx.scope_id, path = %path, count = children.len(), "Folder listed");
        Ok(children.iter().map(TreeEntry::from).collect())
    }
}
