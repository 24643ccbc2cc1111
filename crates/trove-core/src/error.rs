//! Unified application error types for Trove.
//!
//! Every crate maps its failures into [`AppError`] so that the request
//! layer sitting on top of the index can translate one error kind into
//! one outer-layer status.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A path, record or version id does not resolve to any entity.
    NotFound,
    /// The entity exists but has been soft-deleted.
    Gone,
    /// A version specifier is malformed or out of domain (`< 1`).
    InvalidVersionSpecifier,
    /// A well-formed version specifier has no matching version.
    VersionNotFound,
    /// A delete was refused (already deleted, or the scope forbids it).
    DeleteRejected,
    /// Malformed arguments or missing required payload fields.
    BadRequest,
    /// A conflicting state change was attempted.
    Conflict,
    /// A lock could not be acquired in time.
    ServiceUnavailable,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// A storage I/O error occurred.
    Storage,
    /// A cache error occurred.
    Cache,
    /// An internal invariant was broken.
    Internal,
}

impl ErrorKind {
    /// HTTP status the request layer answers with for this kind.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound | Self::VersionNotFound => 404,
            Self::Gone => 410,
            Self::InvalidVersionSpecifier | Self::BadRequest => 400,
            Self::DeleteRejected => 403,
            Self::Conflict => 409,
            Self::ServiceUnavailable => 503,
            Self::Configuration
            | Self::Serialization
            | Self::Storage
            | Self::Cache
            | Self::Internal => 500,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Gone => write!(f, "GONE"),
            Self::InvalidVersionSpecifier => write!(f, "INVALID_VERSION_SPECIFIER"),
            Self::VersionNotFound => write!(f, "VERSION_NOT_FOUND"),
            Self::DeleteRejected => write!(f, "DELETE_REJECTED"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::ServiceUnavailable => write!(f, "SERVICE_UNAVAILABLE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Storage => write!(f, "STORAGE"),
            Self::Cache => write!(f, "CACHE"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Trove.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a gone (soft-deleted) error.
    pub fn gone(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Gone, message)
    }

    /// Create an invalid-version-specifier error.
    pub fn invalid_version(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidVersionSpecifier, message)
    }

    /// Create a version-not-found error.
    pub fn version_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::VersionNotFound, message)
    }

    /// Create a delete-rejected error.
    pub fn delete_rejected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DeleteRejected, message)
    }

    /// Create a bad-request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a service-unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cache, message)
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Outer-layer status code for this error.
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    /// Whether this error has the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Storage, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gone_is_distinct_from_not_found() {
        let gone = AppError::gone("deleted");
        assert!(gone.is(ErrorKind::Gone));
        assert_eq!(gone.status_code(), 410);
        assert_eq!(AppError::not_found("missing").status_code(), 404);
    }

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::invalid_version("Invalid version");
        assert_eq!(err.to_string(), "INVALID_VERSION_SPECIFIER: Invalid version");
    }

    #[test]
    fn test_clone_drops_source() {
        let io = std::io::Error::other("disk");
        let err = AppError::from(io);
        assert!(err.source.is_some());
        let cloned = err.clone();
        assert!(cloned.source.is_none());
        assert_eq!(cloned.kind, ErrorKind::Storage);
    }
}
