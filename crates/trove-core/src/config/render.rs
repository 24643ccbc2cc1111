//! Render cache configuration.

use serde::{Deserialize, Serialize};

/// Settings for the rendered-HTML side channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// How long rendered HTML stays cached, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
    /// How long a pending render claim blocks re-queueing, in seconds.
    #[serde(default = "default_pending_ttl")]
    pub pending_ttl_seconds: u64,
    /// Capacity of the queue feeding the external renderer.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: default_cache_ttl(),
            pending_ttl_seconds: default_pending_ttl(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_cache_ttl() -> u64 {
    86_400
}

fn default_pending_ttl() -> u64 {
    120
}

fn default_queue_capacity() -> usize {
    256
}
