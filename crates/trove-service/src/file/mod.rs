//! File-level services.

pub mod hooks;
pub mod live;
pub mod revisions;
pub mod view;

pub use hooks::HookService;
pub use live::{LiveVersion, resolve_live};
pub use revisions::{RevisionService, version_links};
pub use view::{DownloadMode, ViewService};
