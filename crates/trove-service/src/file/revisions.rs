//! Revision history listing.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use trove_core::result::AppResult;
use trove_core::types::{ActorId, PageRequest, VersionId};
use trove_entity::path::NormalizedPath;
use trove_index::{FileIndex, paginate};
use trove_storage::StorageLocationResolver;

use crate::context::RequestContext;

/// One row of a revision listing.
#[derive(Debug, Clone, Serialize)]
pub struct RevisionSummary {
    /// One-based index in creation order.
    pub index: usize,
    /// Version id.
    pub version_id: VersionId,
    /// Who uploaded it.
    pub creator: ActorId,
    /// Size in bytes, if known.
    pub size: Option<u64>,
    /// Content digests.
    pub hashes: BTreeMap<String, String>,
    /// When it was uploaded.
    pub created_at: DateTime<Utc>,
    /// Where to download it.
    pub download_url: String,
}

/// A page of revisions, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct RevisionListing {
    /// Rows on this page.
    pub revisions: Vec<RevisionSummary>,
    /// Whether older revisions remain.
    pub more: bool,
}

/// Indices to link from a file page, from `current` down to the first.
pub fn version_links(current: usize) -> Vec<usize> {
    (1..=current).rev().collect()
}

/// Lists file histories page by page.
#[derive(Debug, Clone)]
pub struct RevisionService {
    index: Arc<FileIndex>,
    resolver: Arc<dyn StorageLocationResolver>,
    page_size: usize,
}

impl RevisionService {
    /// Creates a new revision service.
    pub fn new(
        index: Arc<FileIndex>,
        resolver: Arc<dyn StorageLocationResolver>,
        page_size: usize,
    ) -> Self {
        Self {
            index,
            resolver,
            page_size,
        }
    }

    /// One page of a file's history.
    ///
    /// `page` is the raw query value; absent means the first page and
    /// anything that is not a non-negative integer is `BadRequest`. Deleted
    /// files still list their history.
    pub async fn list_revisions(
        &self,
        ctx: &RequestContext,
        path: &str,
        page: Option<&str>,
    ) -> AppResult<RevisionListing> {
        let request = PageRequest::parse(page, self.page_size)?;
        let path = NormalizedPath::parse(path)?;
        let record = self.index.record(ctx.scope_id, &path)?;

        let page = paginate(&record.versions(), request);
        let mut revisions = Vec::with_capacity(page.versions.len());
        for (index, version) in page.indices.into_iter().zip(page.versions) {
            let download_url = self
                .resolver
                .download_url(ctx.scope_id, record.path(), index, &version)
                .await?;
            revisions.push(RevisionSummary {
                index,
                version_id: version.id,
                creator: version.creator,
                size: version.size(),
                hashes: version.metadata.hashes,
                created_at: version.created_at,
                download_url,
            });
        }

        debug!(
            scope_id = %ctx.scope_id,
            path = %path,
            page = request.page,
            rows = revisions.len(),
            more = page.has_more,
            "Revisions listed"
        );
        Ok(RevisionListing {
            revisions,
            more: page.has_more,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use trove_core::config::storage::StorageConfig;
    use trove_core::error::ErrorKind;
    use trove_core::types::ScopeId;
    use trove_entity::version::{LocationDescriptor, VersionMetadata};
    use trove_storage::WorkerLocationResolver;

    async fn service(count: usize) -> (RevisionService, Arc<FileIndex>, RequestContext) {
        let index = Arc::new(FileIndex::with_lock_timeout(Duration::from_secs(1)));
        let resolver = Arc::new(WorkerLocationResolver::new(&StorageConfig::default()));
        let ctx = RequestContext::anonymous(ScopeId::new());
        let path = NormalizedPath::parse("log.txt").unwrap();
        for i in 0..count {
            index
                .record_upload(
                    ctx.scope_id,
                    &path,
                    ActorId::new(),
                    LocationDescriptor::new("cloudfiles", format!("o{i}")).unwrap(),
                    VersionMetadata::default(),
                )
                .await
                .unwrap();
        }
        (RevisionService::new(Arc::clone(&index), resolver, 2), index, ctx)
    }

    #[test]
    fn test_version_links() {
        assert_eq!(version_links(3), vec![3, 2, 1]);
        assert!(version_links(0).is_empty());
    }

    #[tokio::test]
    async fn test_pages() {
        let (revisions, _, ctx) = service(3).await;
        let first = revisions.list_revisions(&ctx, "log.txt", None).await.unwrap();
        let indices: Vec<usize> = first.revisions.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![3, 2]);
        assert!(first.more);
        assert!(first.revisions[0].download_url.contains("version=3"));

        let second = revisions.list_revisions(&ctx, "log.txt", Some("1")).await.unwrap();
        assert_eq!(second.revisions.len(), 1);
        assert_eq!(second.revisions[0].index, 1);
        assert!(!second.more);

        let past = revisions.list_revisions(&ctx, "log.txt", Some("5")).await.unwrap();
        assert!(past.revisions.is_empty());
        assert!(!past.more);
    }

    #[tokio::test]
    async fn test_bad_page_and_missing_file() {
        let (revisions, _, ctx) = service(1).await;
        for raw in ["-1", "x", "1.5"] {
            let err = revisions.list_revisions(&ctx, "log.txt", Some(raw)).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::BadRequest, "page {raw:?}");
        }
        let err = revisions.list_revisions(&ctx, "other.txt", None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_deleted_file_keeps_history() {
        let (revisions, index, ctx) = service(2).await;
        index
            .delete_path(ctx.scope_id, &NormalizedPath::parse("log.txt").unwrap(), ActorId::new())
            .unwrap();
        let listing = revisions.list_revisions(&ctx, "log.txt", None).await.unwrap();
        assert_eq!(listing.revisions.len(), 2);
    }
}
