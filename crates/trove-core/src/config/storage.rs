//! Storage location configuration.

use serde::{Deserialize, Serialize};

/// Settings used when issuing byte-transfer endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base URL of the storage worker serving downloads.
    #[serde(default = "default_download_base_url")]
    pub download_base_url: String,
    /// Location field naming the provider-side resource (bucket/container).
    #[serde(default = "default_resource_key")]
    pub resource_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            download_base_url: default_download_base_url(),
            resource_key: default_resource_key(),
        }
    }
}

fn default_download_base_url() -> String {
    "http://localhost:7777".to_string()
}

fn default_resource_key() -> String {
    "resource".to_string()
}
