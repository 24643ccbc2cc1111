//! Store-agnostic persisted shape of a scope's file tree.
//!
//! Directories carry only their name and children; leaves carry the
//! whole record including its version history. Records that were
//! soft-deleted and later replaced at the same path are kept in
//! `retired` so their versions stay addressable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trove_core::types::{RecordId, ScopeId};

use crate::path::NormalizedPath;
use crate::version::Version;

/// Current snapshot format.
pub const SNAPSHOT_FORMAT: u32 = 1;

/// A whole index: every scope the service owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSnapshot {
    /// Snapshot format number.
    pub format: u32,
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
    /// Per-scope trees.
    pub scopes: Vec<ScopeSnapshot>,
}

impl IndexSnapshot {
    /// Wrap scope snapshots in the current format.
    pub fn new(scopes: Vec<ScopeSnapshot>) -> Self {
        Self {
            format: SNAPSHOT_FORMAT,
            taken_at: Utc::now(),
            scopes,
        }
    }
}

/// One scope's tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeSnapshot {
    /// The scope.
    pub scope_id: ScopeId,
    /// Whether the scope is a frozen registration.
    #[serde(default)]
    pub frozen: bool,
    /// Children of the root directory.
    pub children: Vec<NodeSnapshot>,
    /// Deleted records superseded by a newer record at the same path.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub retired: Vec<RecordSnapshot>,
}

/// A node of the persisted tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeSnapshot {
    /// A directory and its children.
    Directory {
        /// Directory name (one path segment).
        name: String,
        /// Child nodes.
        children: Vec<NodeSnapshot>,
    },
    /// A file record leaf.
    File(RecordSnapshot),
}

impl NodeSnapshot {
    /// The node's own name.
    pub fn name(&self) -> &str {
        match self {
            Self::Directory { name, .. } => name,
            Self::File(record) => &record.name,
        }
    }
}

/// A file record with its complete history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSnapshot {
    /// Record identifier.
    pub id: RecordId,
    /// Normalized path.
    pub path: NormalizedPath,
    /// Last path segment.
    pub name: String,
    /// Soft-delete flag.
    pub is_deleted: bool,
    /// Versions, oldest first.
    pub versions: Vec<Version>,
}
