//! Live file views: download, render and the combined view.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use trove_cache::{CacheManager, keys};
use trove_core::result::AppResult;
use trove_core::traits::cache::CacheProvider;
use trove_core::traits::render::RenderCacheGateway;
use trove_core::types::{RenderJob, RenderOutcome, ScopeId, VersionId};
use trove_entity::path::NormalizedPath;
use trove_index::FileIndex;
use trove_storage::StorageLocationResolver;

use crate::context::RequestContext;
use crate::file::live::{LiveVersion, resolve_live};

/// Why bytes are being fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadMode {
    /// A user download; counted.
    #[default]
    Download,
    /// The renderer fetching bytes; not counted.
    Render,
}

impl DownloadMode {
    /// Parse the request's `mode` argument. Anything but `render` is a
    /// plain download.
    pub fn from_query(mode: Option<&str>) -> Self {
        match mode {
            Some(m) if m.eq_ignore_ascii_case("render") => Self::Render,
            _ => Self::Download,
        }
    }
}

/// Where to fetch one version's bytes.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadTicket {
    /// One-based version index.
    pub index: usize,
    /// Version id.
    pub version_id: VersionId,
    /// URL to redirect the client to.
    pub url: String,
}

/// Everything a file page shows.
#[derive(Debug, Clone, Serialize)]
pub struct FileView {
    /// File name.
    pub file_name: String,
    /// Human label, e.g. `Version 3`.
    pub file_revision: String,
    /// Path with a leading slash.
    pub file_path: String,
    /// One-based version index.
    pub index: usize,
    /// Version id.
    pub version_id: VersionId,
    /// Rendered HTML or a pending marker.
    pub rendered: RenderOutcome,
}

/// Serves live versions of files.
#[derive(Debug, Clone)]
pub struct ViewService {
    index: Arc<FileIndex>,
    resolver: Arc<dyn StorageLocationResolver>,
    render: Arc<dyn RenderCacheGateway>,
    cache: CacheManager,
}

impl ViewService {
    /// Creates a new view service.
    pub fn new(
        index: Arc<FileIndex>,
        resolver: Arc<dyn StorageLocationResolver>,
        render: Arc<dyn RenderCacheGateway>,
        cache: CacheManager,
    ) -> Self {
        Self {
            index,
            resolver,
            render,
            cache,
        }
    }

    /// Resolve a live version of `path`.
    pub fn resolve(
        &self,
        ctx: &RequestContext,
        path: &str,
        specifier: Option<&str>,
    ) -> AppResult<LiveVersion> {
        let path = NormalizedPath::parse(path)?;
        resolve_live(&self.index, ctx.scope_id, &path, specifier)
    }

    /// Issue a download URL, counting the download unless the renderer
    /// is the one asking.
    pub async fn download(
        &self,
        ctx: &RequestContext,
        path: &str,
        specifier: Option<&str>,
        mode: DownloadMode,
    ) -> AppResult<DownloadTicket> {
        let live = self.resolve(ctx, path, specifier)?;
        let url = self
            .resolver
            .download_url(ctx.scope_id, live.record.path(), live.index, &live.version)
            .await?;

        if mode != DownloadMode::Render {
            let file_path = live.record.path().as_str();
            self.cache
                .incr(&keys::download_total(ctx.scope_id, file_path))
                .await?;
            self.cache
                .incr(&keys::download_version(ctx.scope_id, file_path, live.index))
                .await?;
        }

        info!(
            scope_id = %ctx.scope_id,
            path = %live.record.path(),
            index = live.index,
            mode = ?mode,
            "Download issued"
        );
        Ok(DownloadTicket {
            index: live.index,
            version_id: live.version.id,
            url,
        })
    }

    /// Rendered HTML for a version, or a pending marker once a render job
    /// has been requested.
    pub async fn render(
        &self,
        ctx: &RequestContext,
        path: &str,
        specifier: Option<&str>,
    ) -> AppResult<RenderOutcome> {
        let live = self.resolve(ctx, path, specifier)?;
        self.render_live(ctx.scope_id, &live).await
    }

    /// File name, revision label, display path and rendered content.
    pub async fn view(
        &self,
        ctx: &RequestContext,
        path: &str,
        specifier: Option<&str>,
    ) -> AppResult<FileView> {
        let live = self.resolve(ctx, path, specifier)?;
        let rendered = self.render_live(ctx.scope_id, &live).await?;
        Ok(FileView {
            file_name: live.record.name(),
            file_revision: format!("Version {}", live.index),
            file_path: live.record.path().display_path(),
            index: live.index,
            version_id: live.version.id,
            rendered,
        })
    }

    /// Downloads counted for a file, or for one version of it.
    pub async fn download_count(
        &self,
        scope_id: ScopeId,
        path: &str,
        index: Option<usize>,
    ) -> AppResult<i64> {
        let path = NormalizedPath::parse(path)?;
        let key = match index {
            Some(index) => keys::download_version(scope_id, path.as_str(), index),
            None => keys::download_total(scope_id, path.as_str()),
        };
        self.cache.counter(&key).await
    }

    async fn render_live(&self, scope_id: ScopeId, live: &LiveVersion) -> AppResult<RenderOutcome> {
        let download_url = self
            .resolver
            .download_url(scope_id, live.record.path(), live.index, &live.version)
            .await?;
        let job = RenderJob {
            scope_id,
            path: live.record.path().to_string(),
            index: live.index,
            version_id: live.version.id,
            download_url,
            cache_key: keys::rendered_html(scope_id, live.version.id),
        };
        let outcome = self.render.fetch_or_render(job).await?;
        debug!(
            scope_id = %scope_id,
            version_id = %live.version.id,
            rendered = outcome.html().is_some(),
            "Render requested"
        );
        Ok(outcome)
    }
}
