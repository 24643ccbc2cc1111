//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::mpsc;

use trove_cache::{CacheManager, CachedRenderGateway};
use trove_core::config::AppConfig;
use trove_core::types::{ActorId, RenderJob, ScopeId};
use trove_entity::path::NormalizedPath;
use trove_index::FileIndex;
use trove_service::{
    HookService, RequestContext, RevisionService, ScopeService, TreeService, ViewService,
};
use trove_storage::{StorageLocationResolver, WorkerLocationResolver};

/// Test application context
pub struct TestApp {
    /// The shared index
    pub index: Arc<FileIndex>,
    /// Render gateway, for completing render jobs
    pub gateway: CachedRenderGateway,
    /// Render jobs queued by views
    pub jobs: mpsc::Receiver<RenderJob>,
    pub tree: TreeService,
    pub revisions: RevisionService,
    pub views: ViewService,
    pub hooks: HookService,
    pub scopes: ScopeService,
    /// Scope every request acts on
    pub scope_id: ScopeId,
    /// Keeps the snapshot directory alive
    _dir: tempfile::TempDir,
}

impl TestApp {
    /// Create a new test application with a fresh scope
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        Self::with_index(
            Arc::new(FileIndex::with_lock_timeout(Duration::from_secs(2))),
            dir,
        )
    }

    /// Wire services around an existing index, persisting into `dir`
    pub fn with_index(index: Arc<FileIndex>, dir: tempfile::TempDir) -> Self {
        let mut config = AppConfig::default();
        config.revisions.page_size = 3;
        config.storage.download_base_url = "https://files.test".to_string();

        let cache = CacheManager::new(&config.cache).expect("Failed to init cache");
        let (gateway, jobs) = CachedRenderGateway::new(cache.clone(), &config.render);
        let resolver: Arc<dyn StorageLocationResolver> =
            Arc::new(WorkerLocationResolver::new(&config.storage));

        Self {
            tree: TreeService::new(Arc::clone(&index)),
            revisions: RevisionService::new(
                Arc::clone(&index),
                Arc::clone(&resolver),
                config.revisions.page_size,
            ),
            views: ViewService::new(
                Arc::clone(&index),
                Arc::clone(&resolver),
                Arc::new(gateway.clone()),
                cache,
            ),
            hooks: HookService::new(Arc::clone(&index), resolver),
            scopes: ScopeService::new(Arc::clone(&index), dir.path().join("index.json")),
            gateway,
            jobs,
            index,
            scope_id: ScopeId::new(),
            _dir: dir,
        }
    }

    /// Context for an anonymous reader of the test scope
    pub fn ctx(&self) -> RequestContext {
        RequestContext::anonymous(self.scope_id)
    }

    /// Context for an actor in the test scope
    pub fn actor_ctx(&self, actor: ActorId) -> RequestContext {
        RequestContext::for_actor(self.scope_id, actor)
    }

    /// Notify an upload through the hook and return the hook's answer
    pub async fn upload(&self, actor: ActorId, path: &str, object: &str) -> Value {
        let receipt = self
            .hooks
            .upload(&self.actor_ctx(actor), upload_payload(actor, path, object))
            .await
            .expect("Upload hook failed");
        serde_json::to_value(receipt).expect("Receipt serializes")
    }
}

/// Upload payload as the storage worker sends it
pub fn upload_payload(actor: ActorId, path: &str, object: &str) -> Value {
    json!({
        "auth": {"id": actor.to_string()},
        "settings": {"resource": "bucket-7"},
        "metadata": {"name": object, "provider": "cloudfiles", "size": 1024},
        "hashes": {"sha256": format!("digest-{object}")},
        "worker": {"host": "worker-1"},
        "path": path,
    })
}

/// Parse a path that is known to be valid
pub fn path(raw: &str) -> NormalizedPath {
    NormalizedPath::parse(raw).expect("Valid path")
}
