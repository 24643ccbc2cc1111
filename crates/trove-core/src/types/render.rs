//! Render request and outcome types exchanged with the render pipeline.

use serde::{Deserialize, Serialize};

use super::id::{ScopeId, VersionId};

/// A request for the external renderer to build HTML for one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderJob {
    /// Scope owning the file.
    pub scope_id: ScopeId,
    /// Normalized file path.
    pub path: String,
    /// One-based version index.
    pub index: usize,
    /// Global version id.
    pub version_id: VersionId,
    /// Where the renderer fetches the bytes from.
    pub download_url: String,
    /// Cache key the finished HTML must be stored under.
    pub cache_key: String,
}

/// Result of asking for a rendered representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "html", rename_all = "lowercase")]
pub enum RenderOutcome {
    /// Cached HTML is available.
    Rendered(String),
    /// Rendering has been requested and is not finished yet.
    Pending,
}

impl RenderOutcome {
    /// The HTML, if rendering already finished.
    pub fn html(&self) -> Option<&str> {
        match self {
            Self::Rendered(html) => Some(html),
            Self::Pending => None,
        }
    }
}
