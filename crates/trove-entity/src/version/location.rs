//! Where a version's bytes live in the external object store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use trove_core::error::AppError;
use trove_core::result::AppResult;

/// Location of one stored object.
///
/// `provider` and `object` are always present; everything else the
/// storage worker sends (bucket, region, worker host...) is kept in
/// `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDescriptor {
    /// Storage provider that holds the object.
    #[serde(rename = "service")]
    pub provider: String,
    /// Provider-side object key (for content-addressed stores, the digest).
    pub object: String,
    /// Provider-specific extension fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LocationDescriptor {
    /// Create a location, rejecting blank provider or object.
    pub fn new(provider: impl Into<String>, object: impl Into<String>) -> AppResult<Self> {
        let provider = provider.into();
        let object = object.into();
        if provider.trim().is_empty() {
            return Err(AppError::bad_request("Location is missing a provider"));
        }
        if object.trim().is_empty() {
            return Err(AppError::bad_request("Location is missing an object key"));
        }
        Ok(Self {
            provider,
            object,
            extra: Map::new(),
        })
    }

    /// Add extension fields; `service` and `object` keys are ignored.
    pub fn with_extra(mut self, fields: Map<String, Value>) -> Self {
        for (key, value) in fields {
            if key != "service" && key != "object" {
                self.extra.insert(key, value);
            }
        }
        self
    }

    /// Look up an extension field as a string.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}
