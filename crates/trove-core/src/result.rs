//! Convenience result type alias for Trove.

use crate::error::AppError;

/// A specialized `Result` type for Trove operations.
pub type AppResult<T> = Result<T, AppError>;
