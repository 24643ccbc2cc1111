//! Revision history paging.

use serde::Serialize;

use trove_core::result::AppResult;
use trove_core::types::PageRequest;
use trove_entity::version::Version;

use crate::record::FileRecord;

/// One page of a record's history, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct RevisionPage {
    /// One-based indices of `versions` in creation order.
    pub indices: Vec<usize>,
    /// Versions on this page, most recent first.
    pub versions: Vec<Version>,
    /// Whether older versions remain after this page.
    pub has_more: bool,
}

impl RevisionPage {
    fn empty() -> Self {
        Self {
            indices: Vec::new(),
            versions: Vec::new(),
            has_more: false,
        }
    }
}

/// Slice a history (oldest first) into a reverse-chronological page.
///
/// A page past the end is empty with `has_more == false`.
pub fn paginate(history: &[Version], request: PageRequest) -> RevisionPage {
    let total = history.len();
    let start = request.offset();
    if start >= total {
        return RevisionPage::empty();
    }
    let end = start.saturating_add(request.page_size).min(total);

    let (indices, versions) = (start..end)
        .map(|k| {
            let index = total - k;
            (index, history[index - 1].clone())
        })
        .unzip();

    RevisionPage {
        indices,
        versions,
        has_more: end < total,
    }
}

impl FileRecord {
    /// Page through this record's history.
    ///
    /// `page` is zero-based; a negative page or a page size below 1 fails
    /// with `BadRequest` before anything is sliced.
    pub fn paginate(&self, page: i64, page_size: i64) -> AppResult<RevisionPage> {
        let request = PageRequest::new(page, page_size)?;
        Ok(paginate(&self.versions(), request))
    }
}
