//! Render cache gateway backed by the cache provider and a job queue.
//!
//! Finished HTML lives in the cache under the job's cache key. A miss
//! claims a pending marker with `set_nx` so that concurrent viewers of the
//! same version enqueue one job between them; the external renderer
//! consumes jobs from the receiver returned by
//! [`CachedRenderGateway::new`] and reports back through
//! [`RenderCacheGateway::store_rendered`].

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

use trove_core::config::render::RenderConfig;
use trove_core::error::AppError;
use trove_core::result::AppResult;
use trove_core::traits::cache::CacheProvider;
use trove_core::traits::render::RenderCacheGateway;
use trove_core::types::RenderJob;

use crate::keys;
use crate::provider::CacheManager;

/// [`RenderCacheGateway`] over a [`CacheManager`].
#[derive(Debug, Clone)]
pub struct CachedRenderGateway {
    cache: CacheManager,
    jobs: mpsc::Sender<RenderJob>,
    html_ttl: Duration,
    pending_ttl: Duration,
}

impl CachedRenderGateway {
    /// Create the gateway and the receiving end of its job queue.
    pub fn new(cache: CacheManager, config: &RenderConfig) -> (Self, mpsc::Receiver<RenderJob>) {
        let (jobs, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let gateway = Self {
            cache,
            jobs,
            html_ttl: Duration::from_secs(config.cache_ttl_seconds),
            pending_ttl: Duration::from_secs(config.pending_ttl_seconds),
        };
        (gateway, receiver)
    }

    /// Whether a render job for `cache_key` is in flight.
    pub async fn is_pending(&self, cache_key: &str) -> AppResult<bool> {
        self.cache.exists(&keys::render_pending(cache_key)).await
    }
}

#[async_trait]
impl RenderCacheGateway for CachedRenderGateway {
    async fn cached(&self, cache_key: &str) -> AppResult<Option<String>> {
        self.cache.get(cache_key).await
    }

    async fn request_render(&self, job: RenderJob) -> AppResult<bool> {
        let pending_key = keys::render_pending(&job.cache_key);
        if !self.cache.set_nx(&pending_key, "1", self.pending_ttl).await? {
            debug!(cache_key = %job.cache_key, "Render already pending");
            return Ok(false);
        }

        let cache_key = job.cache_key.clone();
        match self.jobs.try_send(job) {
            Ok(()) => {
                info!(cache_key = %cache_key, "Render job queued");
                Ok(true)
            }
            Err(TrySendError::Full(_)) => {
                self.cache.delete(&pending_key).await?;
                warn!(cache_key = %cache_key, "Render queue full, job dropped");
                Ok(false)
            }
            Err(TrySendError::Closed(_)) => {
                self.cache.delete(&pending_key).await?;
                Err(AppError::service_unavailable("Render queue is closed"))
            }
        }
    }

    async fn store_rendered(&self, cache_key: &str, html: &str) -> AppResult<()> {
        self.cache.set(cache_key, html, self.html_ttl).await?;
        self.cache.delete(&keys::render_pending(cache_key)).await?;
        debug!(cache_key, bytes = html.len(), "Rendered HTML stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trove_core::config::cache::CacheConfig;
    use trove_core::error::ErrorKind;
    use trove_core::types::{RenderOutcome, ScopeId, VersionId};

    fn job(cache_key: &str) -> RenderJob {
        RenderJob {
            scope_id: ScopeId::new(),
            path: "a/b.csv".to_string(),
            index: 1,
            version_id: VersionId::new(),
            download_url: "http://localhost/download".to_string(),
            cache_key: cache_key.to_string(),
        }
    }

    fn gateway(capacity: usize) -> (CachedRenderGateway, mpsc::Receiver<RenderJob>) {
        let cache = CacheManager::new(&CacheConfig::default()).unwrap();
        let config = RenderConfig {
            queue_capacity: capacity,
            ..RenderConfig::default()
        };
        CachedRenderGateway::new(cache, &config)
    }

    #[tokio::test]
    async fn test_miss_queues_once() {
        let (gateway, mut rx) = gateway(8);
        assert_eq!(gateway.fetch_or_render(job("k1")).await.unwrap(), RenderOutcome::Pending);
        assert_eq!(gateway.fetch_or_render(job("k1")).await.unwrap(), RenderOutcome::Pending);

        let queued = rx.recv().await.unwrap();
        assert_eq!(queued.cache_key, "k1");
        assert!(rx.try_recv().is_err());
        assert!(gateway.is_pending("k1").await.unwrap());
    }

    #[tokio::test]
    async fn test_stored_html_is_served() {
        let (gateway, _rx) = gateway(8);
        gateway.request_render(job("k2")).await.unwrap();
        gateway.store_rendered("k2", "<p>hi</p>").await.unwrap();

        assert!(!gateway.is_pending("k2").await.unwrap());
        assert_eq!(
            gateway.fetch_or_render(job("k2")).await.unwrap(),
            RenderOutcome::Rendered("<p>hi</p>".to_string())
        );
    }

    #[tokio::test]
    async fn test_full_queue_releases_claim() {
        let (gateway, _rx) = gateway(1);
        assert!(gateway.request_render(job("a")).await.unwrap());
        assert!(!gateway.request_render(job("b")).await.unwrap());
        assert!(!gateway.is_pending("b").await.unwrap());
    }

    #[tokio::test]
    async fn test_closed_queue_is_unavailable() {
        let (gateway, rx) = gateway(1);
        drop(rx);
        let err = gateway.request_render(job("c")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
    }
}
