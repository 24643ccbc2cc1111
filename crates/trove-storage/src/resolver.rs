//! Storage location resolver trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use trove_core::result::AppResult;
use trove_core::types::ScopeId;
use trove_entity::path::NormalizedPath;
use trove_entity::version::Version;

/// What the storage worker needs to fetch one version's bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookLocation {
    /// Provider-side object key.
    pub path: String,
    /// Provider settings copied from the version's location.
    pub settings: Map<String, Value>,
}

/// Issues byte-transfer endpoints for file versions.
#[async_trait]
pub trait StorageLocationResolver: Send + Sync + std::fmt::Debug + 'static {
    /// URL a client follows to download one version.
    async fn download_url(
        &self,
        scope_id: ScopeId,
        path: &NormalizedPath,
        index: usize,
        version: &Version,
    ) -> AppResult<String>;

    /// Location answer for the storage worker's read hook.
    async fn locate(&self, version: &Version) -> AppResult<HookLocation>;
}
