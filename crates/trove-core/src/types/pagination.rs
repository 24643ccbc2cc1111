//! Paging arguments for revision history listings.
//!
//! Pages are zero-based. The page number usually arrives as a raw query
//! string, so parsing happens here and fails with `BadRequest` before any
//! slicing is attempted.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// Default number of revisions per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A validated zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Zero-based page number.
    pub page: usize,
    /// Number of items per page (always at least 1).
    pub page_size: usize,
}

impl PageRequest {
    /// Build a page request from already-typed arguments.
    pub fn new(page: i64, page_size: i64) -> AppResult<Self> {
        if page < 0 {
            return Err(AppError::bad_request(format!(
                "Page must not be negative, got {page}"
            )));
        }
        if page_size < 1 {
            return Err(AppError::bad_request(format!(
                "Page size must be positive, got {page_size}"
            )));
        }
        Ok(Self {
            page: page as usize,
            page_size: page_size as usize,
        })
    }

    /// Parse a raw page argument. An absent argument means page 0.
    pub fn parse(raw: Option<&str>, page_size: usize) -> AppResult<Self> {
        let page = match raw {
            None => 0,
            Some(value) => value
                .trim()
                .parse::<i64>()
                .map_err(|_| AppError::bad_request(format!("Invalid page '{value}'")))?,
        };
        Self::new(page, page_size as i64)
    }

    /// Index of the first item on this page.
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}
