//! # trove-index
//!
//! The file-tree index owned by the storage-metadata service. A
//! [`FileIndex`] holds one [`FileTree`] per scope, the global version
//! registry and the per-path locks that make get-or-create linearizable.
//!
//! Lookups, version resolution and paging are synchronous and never wait
//! on anything but short in-memory locks; only get-or-create awaits.

pub mod index;
pub mod locks;
pub mod node;
pub mod pager;
pub mod record;
pub mod resolve;
pub mod snapshot;
pub mod tree;

pub use index::{FileIndex, UploadOutcome};
pub use node::{DirectoryNode, Lookup, TreeNode};
pub use pager::{RevisionPage, paginate};
pub use record::FileRecord;
pub use resolve::{parse_version_specifier, resolve_version};
pub use tree::FileTree;
