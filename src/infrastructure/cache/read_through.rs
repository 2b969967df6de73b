//! Read-through caching shared by every entity service

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::domain::cache::{Cache, CacheExt, CacheKey, Invalidation, Mutation};
use crate::domain::DomainError;

/// Wraps store reads with a cache lookup and store writes with invalidation.
///
/// Cache failures never reach callers: a failed lookup falls through to the
/// loader, a failed populate or delete is logged. Loader errors always
/// propagate and nothing is cached for them.
///
/// Every invalidation bumps a generation counter shared by all clones. A load
/// that overlapped an invalidation returns its value but does not cache it,
/// so a read racing a write cannot park the pre-write state in the cache.
#[derive(Debug, Clone)]
pub struct ReadThroughCache {
    cache: Arc<dyn Cache>,
    ttl: Duration,
    generation: Arc<AtomicU64>,
}

impl ReadThroughCache {
    /// Uses the cache's default TTL for every populated entry
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        let ttl = cache.default_ttl();

        Self {
            cache,
            ttl,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn cache(&self) -> &Arc<dyn Cache> {
        &self.cache
    }

    /// Returns the cached value for `key`, or loads, caches and returns it
    pub async fn get_or_load<V, F, Fut>(&self, key: CacheKey, load: F) -> Result<V, DomainError>
    where
        V: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<V, DomainError>> + Send,
    {
        let key = key.to_string();
        let generation = self.generation.load(Ordering::SeqCst);

        if let Some(value) = self.lookup(&key).await {
            return Ok(value);
        }

        let value = load().await?;
        self.populate(&key, &value, generation).await;

        Ok(value)
    }

    /// Like [`Self::get_or_load`] for single-entity reads; absence is not cached
    pub async fn get_or_load_optional<V, F, Fut>(
        &self,
        key: CacheKey,
        load: F,
    ) -> Result<Option<V>, DomainError>
    where
        V: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<Option<V>, DomainError>> + Send,
    {
        let key = key.to_string();
        let generation = self.generation.load(Ordering::SeqCst);

        if let Some(value) = self.lookup(&key).await {
            return Ok(Some(value));
        }

        let value = load().await?;

        if let Some(ref found) = value {
            self.populate(&key, found, generation).await;
        }

        Ok(value)
    }

    /// Drops every cached query the mutation can change.
    ///
    /// Write paths call this before the store write and again once it has
    /// succeeded.
    pub async fn invalidate(&self, mutation: &Mutation<'_>) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let entries = mutation.invalidations();

        debug!(
            mutation = mutation.name(),
            entries = entries.len(),
            "Invalidating cache"
        );

        for entry in entries {
            let result = match &entry {
                Invalidation::Key(key) => self.cache.delete(&key.to_string()).await.map(|_| ()),
                Invalidation::Family(family) => {
                    self.cache.delete_pattern(family.pattern()).await.map(|_| ())
                }
            };

            if let Err(e) = result {
                warn!(
                    mutation = mutation.name(),
                    entry = ?entry,
                    error = %e,
                    "Cache invalidation failed"
                );
            }
        }
    }

    async fn lookup<V>(&self, key: &str) -> Option<V>
    where
        V: DeserializeOwned + Send,
    {
        match self.cache.get(key).await {
            Ok(Some(value)) => {
                debug!(key = %key, "Cache hit");
                Some(value)
            }
            Ok(None) => {
                debug!(key = %key, "Cache miss");
                None
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache lookup failed, reading from store");
                None
            }
        }
    }

    async fn populate<V>(&self, key: &str, value: &V, loaded_at: u64)
    where
        V: Serialize + Send + Sync,
    {
        if self.generation.load(Ordering::SeqCst) != loaded_at {
            debug!(key = %key, "Skipping populate, a write overlapped the load");
            return;
        }

        if let Err(e) = self.cache.set(key, value, self.ttl).await {
            warn!(key = %key, error = %e, "Failed to populate cache");
            return;
        }

        // An invalidation that landed between the check and the set may have
        // deleted before this entry existed
        if self.generation.load(Ordering::SeqCst) != loaded_at {
            if let Err(e) = self.cache.delete(key).await {
                warn!(key = %key, error = %e, "Failed to drop overlapped entry");
            }
        }
    }
}
