//! Resolution of a live file version for reading.

use std::sync::Arc;

use trove_core::result::AppResult;
use trove_core::types::ScopeId;
use trove_entity::path::NormalizedPath;
use trove_entity::version::Version;
use trove_index::{FileIndex, FileRecord, resolve_version};

/// A version resolved through a live (non-deleted) record.
#[derive(Debug, Clone)]
pub struct LiveVersion {
    /// The owning record.
    pub record: Arc<FileRecord>,
    /// One-based index of the version.
    pub index: usize,
    /// The version.
    pub version: Version,
}

/// Resolve `(path, specifier)` for viewing or downloading.
///
/// Fails with `NotFound` for a missing path, then `Gone` for a deleted
/// record, and only then with the version resolution errors.
pub fn resolve_live(
    index: &FileIndex,
    scope_id: ScopeId,
    path: &NormalizedPath,
    specifier: Option<&str>,
) -> AppResult<LiveVersion> {
    let record = index.live_record(scope_id, path)?;
    let (position, version) = resolve_version(&record, specifier)?;
    Ok(LiveVersion {
        record,
        index: position,
        version,
    })
}
