//! # trove-entity
//!
//! Domain entity models for Trove. Every struct in this crate is a plain
//! value: the concurrent, shared forms of records and trees live in
//! `trove-index`. All entities derive `Debug`, `Clone`, `Serialize` and
//! `Deserialize`.

pub mod path;
pub mod tree;
pub mod version;

pub use path::NormalizedPath;
pub use tree::{EntryKind, IndexSnapshot, NodeSnapshot, RecordSnapshot, ScopeSnapshot};
pub use version::{LocationDescriptor, Version, VersionMetadata};
