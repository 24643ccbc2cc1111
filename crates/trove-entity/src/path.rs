//! Normalized, project-relative file paths.

use std::fmt;

use serde::{Deserialize, Serialize};

use trove_core::error::AppError;
use trove_core::result::AppResult;

/// A slash-separated path relative to a scope root, without leading or
/// trailing slashes. The empty path is the scope root.
///
/// The path doubles as the unique key of a record and as its address in
/// the tree; [`NormalizedPath::segments`] is the only way the tree descends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NormalizedPath(String);

impl NormalizedPath {
    /// Normalize a raw path. Surrounding slashes are stripped; empty,
    /// `.` and `..` segments are rejected.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let trimmed = raw.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        for segment in trimmed.split('/') {
            if segment.is_empty() {
                return Err(AppError::bad_request(format!(
                    "Path '{raw}' contains an empty segment"
                )));
            }
            if segment == "." || segment == ".." {
                return Err(AppError::bad_request(format!(
                    "Path '{raw}' contains a relative segment"
                )));
            }
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The scope root.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Whether this is the scope root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments from the root down.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// The last segment, or `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments().last()
    }

    /// The path made of the first `n` segments.
    pub fn prefix(&self, n: usize) -> Self {
        Self(self.segments().take(n).collect::<Vec<_>>().join("/"))
    }

    /// The parent directory path. The root is its own parent.
    pub fn parent(&self) -> Self {
        self.prefix(self.depth().saturating_sub(1))
    }

    /// Append a single segment.
    pub fn join(&self, segment: &str) -> AppResult<Self> {
        if self.is_root() {
            Self::parse(segment)
        } else {
            Self::parse(&format!("{}/{}", self.0, segment))
        }
    }

    /// The path with a leading slash, as shown to users.
    pub fn display_path(&self) -> String {
        format!("/{}", self.0)
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for NormalizedPath {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NormalizedPath> for String {
    fn from(path: NormalizedPath) -> Self {
        path.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trove_core::error::ErrorKind;

    #[test]
    fn test_strips_surrounding_slashes() {
        let path = NormalizedPath::parse("/a/b/report.csv/").unwrap();
        assert_eq!(path.as_str(), "a/b/report.csv");
        assert_eq!(path.name(), Some("report.csv"));
        assert_eq!(path.segments().collect::<Vec<_>>(), vec!["a", "b", "report.csv"]);
    }

    #[test]
    fn test_keeps_whitespace_in_names() {
        let path = NormalizedPath::parse("/docs/ notes.txt ").unwrap();
        assert_eq!(path.as_str(), "docs/ notes.txt ");
        assert_eq!(path.name(), Some(" notes.txt "));
        assert_ne!(path, NormalizedPath::parse("docs/notes.txt").unwrap());
    }

    #[test]
    fn test_empty_is_root() {
        let root = NormalizedPath::parse("").unwrap();
        assert!(root.is_root());
        assert_eq!(root.depth(), 0);
        assert_eq!(root.name(), None);
        assert_eq!(NormalizedPath::parse("/").unwrap(), root);
    }

    #[test]
    fn test_rejects_bad_segments() {
        for raw in ["a//b", "a/./b", "../etc"] {
            let err = NormalizedPath::parse(raw).unwrap_err();
            assert_eq!(err.kind, ErrorKind::BadRequest, "input {raw:?}");
        }
    }

    #[test]
    fn test_prefix_and_parent() {
        let path = NormalizedPath::parse("a/b/c").unwrap();
        assert_eq!(path.prefix(2).as_str(), "a/b");
        assert_eq!(path.parent().as_str(), "a/b");
        assert!(NormalizedPath::parse("a").unwrap().parent().is_root());
        assert_eq!(path.display_path(), "/a/b/c");
    }

    #[test]
    fn test_join() {
        let root = NormalizedPath::root();
        assert_eq!(root.join("a").unwrap().as_str(), "a");
        assert_eq!(root.join("a").unwrap().join("b").unwrap().as_str(), "a/b");
    }

    #[test]
    fn test_deserialize_normalizes() {
        let path: NormalizedPath = serde_json::from_str("\"/x/y\"").unwrap();
        assert_eq!(path.as_str(), "x/y");
        assert!(serde_json::from_str::<NormalizedPath>("\"x//y\"").is_err());
    }
}
