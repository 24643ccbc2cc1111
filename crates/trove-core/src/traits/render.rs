//! Gateway to the rendered-HTML side channel.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::render::{RenderJob, RenderOutcome};

/// Access to cached rendered representations of file versions.
///
/// The index never renders anything itself: it either finds HTML that
/// the external renderer already produced, or hands it a [`RenderJob`].
#[async_trait]
pub trait RenderCacheGateway: Send + Sync + std::fmt::Debug + 'static {
    /// Look up finished HTML for a cache key.
    async fn cached(&self, cache_key: &str) -> AppResult<Option<String>>;

    /// Queue a render job unless one is already pending for the same key.
    /// Returns `true` when a new job was queued.
    async fn request_render(&self, job: RenderJob) -> AppResult<bool>;

    /// Store HTML produced by the renderer.
    async fn store_rendered(&self, cache_key: &str, html: &str) -> AppResult<()>;

    /// Return cached HTML or start rendering it.
    async fn fetch_or_render(&self, job: RenderJob) -> AppResult<RenderOutcome> {
        if let Some(html) = self.cached(&job.cache_key).await? {
            return Ok(RenderOutcome::Rendered(html));
        }
        self.request_render(job).await?;
        Ok(RenderOutcome::Pending)
    }
}
