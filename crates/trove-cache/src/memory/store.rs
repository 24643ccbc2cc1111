//! In-memory cache implementation using the moka crate.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use moka::Expiry;
use moka::future::Cache;
use tracing::debug;

use trove_core::config::cache::MemoryCacheConfig;
use trove_core::result::AppResult;
use trove_core::traits::cache::CacheProvider;

/// A cached value together with its own lifetime.
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with.
#[derive(Debug)]
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-memory cache provider using moka.
///
/// Counters live in a separate map so that increments are atomic; they do
/// not expire.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    cache: Cache<String, Entry>,
    counters: Arc<DashMap<String, AtomicI64>>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    ///
    /// `time_to_live_seconds` caps every entry's lifetime regardless of the
    /// TTL it was written with.
    pub fn new(config: &MemoryCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.time_to_live_seconds))
            .expire_after(PerEntryTtl)
            .build();

        Self {
            cache,
            counters: Arc::new(DashMap::new()),
        }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        if let Some(entry) = self.cache.get(key).await {
            return Ok(Some(entry.value));
        }
        Ok(self
            .counters
            .get(key)
            .map(|counter| counter.load(Ordering::SeqCst).to_string()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.cache
            .insert(
                key.to_string(),
                Entry {
                    value: value.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.remove(key).await;
        self.counters.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.cache.contains_key(key) || self.counters.contains_key(key))
    }

    async fn delete_pattern(&self, pattern: &str) -> AppResult<u64> {
        let prefix = pattern.split('*').next().unwrap_or_default();

        let keys: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.to_string())
            .collect();
        let mut count = keys.len() as u64;
        for key in keys {
            self.cache.remove(&key).await;
        }

        let before = self.counters.len();
        self.counters.retain(|key, _| !key.starts_with(prefix));
        count += (before - self.counters.len()) as u64;

        debug!(pattern, count, "Deleted keys matching pattern");
        Ok(count)
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let entry = self
            .cache
            .entry(key.to_string())
            .or_insert_with(async {
                Entry {
                    value: value.to_string(),
                    ttl,
                }
            })
            .await;
        Ok(entry.is_fresh())
    }

    async fn incr(&self, key: &str) -> AppResult<i64> {
        let counter = self
            .counters
            .entry(key.to_string())
            .or_insert_with(|| AtomicI64::new(0));
        Ok(counter.value().fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
