//! Wires the index, cache, render gateway and services from configuration.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use trove_cache::{CacheManager, CachedRenderGateway};
use trove_core::config::AppConfig;
use trove_core::result::AppResult;
use trove_core::types::RenderJob;
use trove_index::FileIndex;
use trove_service::{HookService, RevisionService, ScopeService, TreeService, ViewService};
use trove_storage::{StorageLocationResolver, WorkerLocationResolver};

/// Everything a command needs, restored from the snapshot file.
#[derive(Debug)]
pub struct App {
    pub config: AppConfig,
    pub scopes: ScopeService,
    pub tree: TreeService,
    pub revisions: RevisionService,
    pub views: ViewService,
    pub hooks: HookService,
    /// Held so that render requests are queued rather than refused; the
    /// CLI has no renderer attached.
    _render_jobs: mpsc::Receiver<RenderJob>,
}

impl App {
    /// Build the services and load the snapshot if one exists.
    pub async fn open(config: AppConfig) -> AppResult<Self> {
        let index = Arc::new(FileIndex::new(&config.index));
        let cache = CacheManager::new(&config.cache)?;
        let (gateway, render_jobs) = CachedRenderGateway::new(cache.clone(), &config.render);
        let resolver: Arc<dyn StorageLocationResolver> =
            Arc::new(WorkerLocationResolver::new(&config.storage));

        let scopes = ScopeService::new(Arc::clone(&index), &config.index.snapshot_path);
        let restored = scopes.restore().await?;
        info!(
            snapshot = %config.index.snapshot_path,
            restored,
            scopes = scopes.scopes().len(),
            "Index opened"
        );

        Ok(Self {
            tree: TreeService::new(Arc::clone(&index)),
            revisions: RevisionService::new(
                Arc::clone(&index),
                Arc::clone(&resolver),
                config.revisions.page_size,
            ),
            views: ViewService::new(
                Arc::clone(&index),
                Arc::clone(&resolver),
                Arc::new(gateway),
                cache,
            ),
            hooks: HookService::new(index, resolver),
            scopes,
            config,
            _render_jobs: render_jobs,
        })
    }

    /// Write the index back to the snapshot file.
    pub async fn persist(&self) -> AppResult<()> {
        self.scopes.persist().await
    }
}
