//! Resolver that points at the external storage worker.

use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Map;
use tracing::debug;

use trove_core::config::storage::StorageConfig;
use trove_core::error::AppError;
use trove_core::result::AppResult;
use trove_core::types::ScopeId;
use trove_entity::path::NormalizedPath;
use trove_entity::version::Version;

use crate::resolver::{HookLocation, StorageLocationResolver};

/// Characters left unescaped in query values.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Builds download URLs under the worker's base URL.
#[derive(Debug, Clone)]
pub struct WorkerLocationResolver {
    base_url: String,
    resource_key: String,
}

impl WorkerLocationResolver {
    /// Create a resolver from configuration.
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            base_url: config.download_base_url.trim_end_matches('/').to_string(),
            resource_key: config.resource_key.clone(),
        }
    }

    fn encode(value: &str) -> String {
        utf8_percent_encode(value, QUERY_VALUE).to_string()
    }
}

#[async_trait]
impl StorageLocationResolver for WorkerLocationResolver {
    async fn download_url(
        &self,
        scope_id: ScopeId,
        path: &NormalizedPath,
        index: usize,
        version: &Version,
    ) -> AppResult<String> {
        let location = &version.location;
        if location.object.trim().is_empty() {
            return Err(AppError::bad_request(format!(
                "Version {} has no object key",
                version.id
            )));
        }
        let url = format!(
            "{}/download/{}/{}?scope={}&path={}&version={}",
            self.base_url,
            Self::encode(&location.provider),
            Self::encode(&location.object),
            scope_id,
            Self::encode(path.as_str()),
            index
        );
        debug!(version_id = %version.id, url = %url, "Download URL issued");
        Ok(url)
    }

    async fn locate(&self, version: &Version) -> AppResult<HookLocation> {
        let object = version.location_hash();
        if object.trim().is_empty() {
            return Err(AppError::bad_request(format!(
                "Version {} has no object key",
                version.id
            )));
        }
        let mut settings = Map::new();
        if let Some(resource) = version.location.extra.get(&self.resource_key) {
            settings.insert(self.resource_key.clone(), resource.clone());
        }
        Ok(HookLocation {
            path: object.to_string(),
            settings,
        })
    }
}
