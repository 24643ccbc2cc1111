//! File tree entities: entry kinds and the persisted tree shape.

pub mod snapshot;

pub use snapshot::{IndexSnapshot, NodeSnapshot, RecordSnapshot, ScopeSnapshot};

use serde::{Deserialize, Serialize};

/// Kind of a tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// An intermediate directory node.
    Directory,
    /// A file record leaf.
    File,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Directory => write!(f, "folder"),
            Self::File => write!(f, "file"),
        }
    }
}
