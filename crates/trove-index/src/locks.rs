//! Keyed async mutexes with bounded acquisition time.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::warn;

use trove_core::error::AppError;
use trove_core::result::AppResult;

/// One mutex per key, created on demand and dropped once idle.
#[derive(Debug)]
pub struct KeyedLocks<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    locks: DashMap<K, Arc<Mutex<()>>>,
}

/// Holds the lock for one key until dropped.
#[derive(Debug)]
pub struct KeyedGuard<'a, K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    owner: &'a KeyedLocks<K>,
    key: K,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Acquire the lock for `key`, waiting at most `timeout`.
    ///
    /// A timeout surfaces as `ServiceUnavailable`; dropping the returned
    /// future abandons the wait without side effects.
    pub async fn acquire(&self, key: K, timeout: Duration) -> AppResult<KeyedGuard<'_, K>> {
        let mutex = Arc::clone(
            self.locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );

        match tokio::time::timeout(timeout, mutex.lock_owned()).await {
            Ok(guard) => Ok(KeyedGuard {
                owner: self,
                key,
                guard: Some(guard),
            }),
            Err(_) => {
                warn!(key = ?key, timeout_ms = timeout.as_millis() as u64, "Lock acquisition timed out");
                self.release_idle(&key);
                Err(AppError::service_unavailable(format!(
                    "Timed out waiting for lock on {key:?}"
                )))
            }
        }
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no key is tracked.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    fn release_idle(&self, key: &K) {
        self.locks
            .remove_if(key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

impl<K> Default for KeyedLocks<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Drop for KeyedGuard<'_, K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    fn drop(&mut self) {
        self.guard.take();
        self.owner.release_idle(&self.key);
    }
}
