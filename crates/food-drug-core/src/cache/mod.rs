//! Request cache: keyed memoization and in-flight deduplication of repository
//! calls.
//!
//! Built on `moka::future::Cache`:
//! - a fresh entry is returned without running the fetcher
//! - concurrent callers of a missing key share one in-flight fetch
//! - a failed fetch reaches every waiter and is never stored, so the next
//!   call retries
//! - entries expire after the configured time-to-live
//! - a value refused by the retention check is handed to the waiters the same
//!   way a failure is, so it is never stored

mod key;

pub use key::*;

use std::future::Future;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, warn};

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};

/// Outcome of an in-flight fetch that must not be stored.
enum Unstored<V> {
    Failed(CoreError),
    Rejected(V),
}

/// Cache of successful fetch results of type `V`.
pub struct RequestCache<V> {
    name: &'static str,
    entries: Cache<CacheKey, V>,
}

impl<V> RequestCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache whose entries go stale after `ttl`.
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            entries: Cache::builder().time_to_live(ttl).build(),
        }
    }

    pub fn from_config(name: &'static str, config: &CoreConfig) -> Self {
        Self::new(name, config.cache_ttl())
    }

    /// Cached value for `key`, fetching it if absent or stale.
    pub async fn get<F, Fut>(&self, key: CacheKey, fetcher: F) -> CoreResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CoreResult<V>>,
    {
        self.get_retaining(key, fetcher, |_| true).await
    }

    /// Like [`get`](Self::get), but a freshly fetched value is only kept when
    /// `keep` accepts it. Callers joining the same in-flight fetch still
    /// receive the value.
    pub async fn get_retaining<F, Fut, K>(&self, key: CacheKey, fetcher: F, keep: K) -> CoreResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CoreResult<V>>,
        K: FnOnce(&V) -> bool,
    {
        if let Some(value) = self.entries.get(&key).await {
            debug!(cache = self.name, key = %key, "cache hit");
            return Ok(value);
        }

        debug!(cache = self.name, key = %key, "cache miss");
        let init = async move {
            match fetcher().await {
                Ok(value) if keep(&value) => Ok(value),
                Ok(value) => Err(Unstored::Rejected(value)),
                Err(error) => Err(Unstored::Failed(error)),
            }
        };

        match self.entries.try_get_with(key.clone(), init).await {
            Ok(value) => Ok(value),
            Err(unstored) => match unstored.as_ref() {
                Unstored::Rejected(value) => {
                    debug!(cache = self.name, key = %key, "result not retained");
                    Ok(value.clone())
                }
                Unstored::Failed(error) => {
                    warn!(cache = self.name, key = %key, %error, "fetch failed, will retry on next request");
                    Err(error.clone())
                }
            },
        }
    }

    /// Whether a fresh entry exists for `key`.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Drop the entry for `key`.
    pub async fn invalidate(&self, key: &CacheKey) {
        self.entries.invalidate(key).await;
    }

    /// Drop every entry.
    pub fn invalidate_all(&self) {
        debug!(cache = self.name, "invalidating all entries");
        self.entries.invalidate_all();
    }

    /// Number of live entries.
    pub async fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}
