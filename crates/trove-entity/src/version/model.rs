//! File version entity.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trove_core::error::AppError;
use trove_core::result::AppResult;
use trove_core::types::{ActorId, VersionId};

use super::location::LocationDescriptor;
use super::metadata::VersionMetadata;

/// One immutable revision of a file's bytes.
///
/// Only [`Version::confirm`] changes a version after creation, and only
/// once: the storage worker reports final hashes and size after the
/// upload has settled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    /// Global version identifier.
    pub id: VersionId,
    /// Actor who uploaded this version.
    pub creator: ActorId,
    /// Where the bytes are stored.
    pub location: LocationDescriptor,
    /// Content metadata.
    pub metadata: VersionMetadata,
    /// When this version was created.
    pub created_at: DateTime<Utc>,
    /// When the storage worker confirmed the metadata, if it has.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl Version {
    /// Create a new, unconfirmed version.
    pub fn new(creator: ActorId, location: LocationDescriptor, metadata: VersionMetadata) -> Self {
        Self {
            id: VersionId::new(),
            creator,
            location,
            metadata,
            created_at: Utc::now(),
            confirmed_at: None,
        }
    }

    /// Content size in bytes, if known.
    pub fn size(&self) -> Option<u64> {
        self.metadata.size
    }

    /// Content digests keyed by algorithm.
    pub fn content_hash(&self) -> &BTreeMap<String, String> {
        &self.metadata.hashes
    }

    /// The object key identifying the stored bytes.
    pub fn location_hash(&self) -> &str {
        &self.location.object
    }

    /// Merge confirmed metadata into this version.
    ///
    /// Fails with `Conflict` if the version was already confirmed; the
    /// version is left unchanged in that case.
    pub fn confirm(&mut self, metadata: VersionMetadata) -> AppResult<()> {
        if let Some(at) = self.confirmed_at {
            return Err(AppError::conflict(format!(
                "Version {} metadata was already confirmed at {at}",
                self.id
            )));
        }
        self.metadata.merge(metadata);
        self.confirmed_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trove_core::error::ErrorKind;

    fn version() -> Version {
        Version::new(
            ActorId::new(),
            LocationDescriptor::new("cloudfiles", "deadbeef").unwrap(),
            VersionMetadata::default(),
        )
    }

    #[test]
    fn test_confirm_once() {
        let mut v = version();
        v.confirm(VersionMetadata {
            size: Some(42),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(v.size(), Some(42));
        assert!(v.confirmed_at.is_some());

        let err = v
            .confirm(VersionMetadata {
                size: Some(1),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(v.size(), Some(42));
    }

    #[test]
    fn test_location_hash() {
        assert_eq!(version().location_hash(), "deadbeef");
    }
}
