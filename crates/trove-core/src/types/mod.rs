//! Core type definitions used across the Trove workspace.

pub mod id;
pub mod pagination;
pub mod render;

pub use id::*;
pub use pagination::PageRequest;
pub use render::{RenderJob, RenderOutcome};
