//! Version-specifier resolution.
//!
//! A specifier is either absent, meaning the latest version, or a
//! one-based index into the record's history. Resolution is pure and works
//! on deleted records too; callers that serve live content check the
//! delete flag first.

use trove_core::error::AppError;
use trove_core::result::AppResult;
use trove_entity::version::Version;

use crate::record::FileRecord;

/// Parse a caller-supplied version specifier into a one-based index.
///
/// Fails with `InvalidVersionSpecifier` if the string is not an integer or
/// is below 1. A positive integer too large to represent is well-formed
/// but can never match, so it fails with `VersionNotFound`.
pub fn parse_version_specifier(raw: &str) -> AppResult<usize> {
    let trimmed = raw.trim();
    let index: i64 = match trimmed.parse() {
        Ok(index) => index,
        Err(_) if is_positive_integer(trimmed) => {
            return Err(AppError::version_not_found(format!(
                "Version '{raw}' does not exist"
            )));
        }
        Err(_) => return Err(AppError::invalid_version(format!("Invalid version '{raw}'"))),
    };
    if index < 1 {
        return Err(AppError::invalid_version(format!(
            "Invalid version '{raw}', versions start at 1"
        )));
    }
    usize::try_from(index)
        .map_err(|_| AppError::version_not_found(format!("Version '{raw}' does not exist")))
}

fn is_positive_integer(raw: &str) -> bool {
    let digits = raw.strip_prefix('+').unwrap_or(raw);
    !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && digits.bytes().any(|b| b != b'0')
}

/// Resolve a specifier against a record's history.
///
/// Returns the one-based index and the version. An index past the end of
/// the history, or asking a record without versions for its latest,
/// fails with `VersionNotFound`.
pub fn resolve_version(record: &FileRecord, specifier: Option<&str>) -> AppResult<(usize, Version)> {
    match specifier {
        None => record.latest().ok_or_else(|| {
            AppError::version_not_found(format!("File '{}' has no versions", record.path()))
        }),
        Some(raw) => {
            let index = parse_version_specifier(raw)?;
            record
                .version(index)
                .map(|version| (index, version))
                .ok_or_else(|| {
                    AppError::version_not_found(format!(
                        "File '{}' has no version {index}",
                        record.path()
                    ))
                })
        }
    }
}
