//! # trove-service
//!
//! Use cases on top of the file index. Each service is built by
//! constructor injection from `Arc` references to the index, the cache,
//! the render gateway and the storage location resolver.
//!
//! Hook handlers take the storage worker's raw JSON payloads and turn
//! them into typed index operations; everything else takes a
//! [`RequestContext`] naming the scope being acted on.

pub mod context;
pub mod file;
pub mod folder;
pub mod scope;

pub use context::RequestContext;
pub use file::{DownloadMode, HookService, RevisionService, ViewService};
pub use folder::TreeService;
pub use scope::ScopeService;
