//! Metadata describing a version's content.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use trove_core::error::AppError;
use trove_core::result::AppResult;

/// Typed metadata with a residual map for provider-specific fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionMetadata {
    /// Content size in bytes, once known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// MIME type reported by the provider.
    #[serde(default, rename = "contentType", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Provider-side modification timestamp, verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    /// Content digests keyed by algorithm (`md5`, `sha256`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hashes: BTreeMap<String, String>,
    /// Everything else.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VersionMetadata {
    /// Build metadata from a raw JSON object, validating known fields.
    ///
    /// `size` may arrive as a number or as a numeric string.
    pub fn from_json(mut raw: Map<String, Value>) -> AppResult<Self> {
        let size = match raw.remove("size") {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => Some(
                n.as_u64()
                    .ok_or_else(|| AppError::bad_request(format!("Invalid size '{n}'")))?,
            ),
            Some(Value::String(s)) => Some(
                s.trim()
                    .parse::<u64>()
                    .map_err(|_| AppError::bad_request(format!("Invalid size '{s}'")))?,
            ),
            Some(other) => {
                return Err(AppError::bad_request(format!("Invalid size '{other}'")));
            }
        };
        let content_type = take_string(&mut raw, "contentType")?;
        let modified = take_string(&mut raw, "modified")?;
        let hashes = match raw.remove("hashes") {
            None | Some(Value::Null) => BTreeMap::new(),
            Some(Value::Object(map)) => parse_hashes(map)?,
            Some(_) => return Err(AppError::bad_request("Field 'hashes' must be an object")),
        };

        Ok(Self {
            size,
            content_type,
            modified,
            hashes,
            extra: raw,
        })
    }

    /// Attach digests reported separately from the metadata object.
    pub fn with_hashes(mut self, hashes: Map<String, Value>) -> AppResult<Self> {
        self.hashes.extend(parse_hashes(hashes)?);
        Ok(self)
    }

    /// Merge `other` into `self`: present fields win, maps are extended.
    pub fn merge(&mut self, other: VersionMetadata) {
        if other.size.is_some() {
            self.size = other.size;
        }
        if other.content_type.is_some() {
            self.content_type = other.content_type;
        }
        if other.modified.is_some() {
            self.modified = other.modified;
        }
        self.hashes.extend(other.hashes);
        self.extra.extend(other.extra);
    }
}

fn take_string(raw: &mut Map<String, Value>, key: &str) -> AppResult<Option<String>> {
    match raw.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(AppError::bad_request(format!("Field '{key}' must be a string"))),
    }
}

fn parse_hashes(map: Map<String, Value>) -> AppResult<BTreeMap<String, String>> {
    map.into_iter()
        .map(|(algorithm, digest)| match digest {
            Value::String(digest) => Ok((algorithm.to_lowercase(), digest)),
            _ => Err(AppError::bad_request(format!(
                "Digest for '{algorithm}' must be a string"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_from_json_splits_known_fields() {
        let meta = VersionMetadata::from_json(object(json!({
            "size": "1024",
            "contentType": "text/csv",
            "name": "report.csv",
        })))
        .unwrap();

        assert_eq!(meta.size, Some(1024));
        assert_eq!(meta.content_type.as_deref(), Some("text/csv"));
        assert_eq!(meta.extra.get("name"), Some(&json!("report.csv")));
    }

    #[test]
    fn test_invalid_size_is_bad_request() {
        let err = VersionMetadata::from_json(object(json!({"size": "big"}))).unwrap_err();
        assert_eq!(err.kind, trove_core::error::ErrorKind::BadRequest);
        assert!(VersionMetadata::from_json(object(json!({"size": -3}))).is_err());
    }

    #[test]
    fn test_hashes_are_lowercased() {
        let meta = VersionMetadata::default()
            .with_hashes(object(json!({"SHA256": "abc", "md5": "def"})))
            .unwrap();
        assert_eq!(meta.hashes.get("sha256").map(String::as_str), Some("abc"));
        assert_eq!(meta.hashes.len(), 2);
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut base = VersionMetadata {
            content_type: Some("text/plain".into()),
            ..Default::default()
        };
        base.merge(VersionMetadata {
            size: Some(7),
            ..Default::default()
        });
        assert_eq!(base.size, Some(7));
        assert_eq!(base.content_type.as_deref(), Some("text/plain"));
    }
}
