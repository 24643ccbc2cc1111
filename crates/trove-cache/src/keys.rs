//! Cache key builders for every Trove cache entry.
//!
//! Centralising key construction keeps the key layout shared by the
//! service and the external renderer in one place.

use trove_core::types::{ScopeId, VersionId};

/// Cache key for the rendered HTML of one version.
pub fn rendered_html(scope_id: ScopeId, version_id: VersionId) -> String {
    format!("render:{scope_id}:{version_id}")
}

/// Claim marker held while a render job for `cache_key` is in flight.
pub fn render_pending(cache_key: &str) -> String {
    format!("{cache_key}:pending")
}

/// Download counter for a file across all its versions.
pub fn download_total(scope_id: ScopeId, path: &str) -> String {
    format!("download:{scope_id}:{path}")
}

/// Download counter for one version of a file.
pub fn download_version(scope_id: ScopeId, path: &str, index: usize) -> String {
    format!("download:{scope_id}:{path}:{index}")
}
