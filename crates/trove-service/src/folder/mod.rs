//! Folder listing services.

pub mod tree;

pub use tree::{TreeEntry, TreeService};
