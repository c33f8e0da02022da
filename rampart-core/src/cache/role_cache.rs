//! Memoized role lookups with explicit invalidation

use super::key::RoleCacheKey;
use super::memory::MemoryCacheStore;
use super::traits::{CacheEntry, CacheStore};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::roles::RoleSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Cache of `(principal, context) -> roles`
///
/// Concurrent misses on the same key may each run `compute`; the last write
/// wins. Once an entry has expired, the first reader inside the race-condition
/// grace window pushes the expiry forward and recomputes while everyone else
/// keeps getting the stale value, so an expiring hot key does not trigger a
/// burst of identical role store queries.
#[derive(Clone)]
pub struct RoleCache {
    store: Arc<dyn CacheStore<RoleSet>>,
    config: CacheConfig,
}

impl RoleCache {
    /// Create a role cache over a private in-memory store
    pub fn new(config: CacheConfig) -> Self {
        Self::with_store(config, Arc::new(MemoryCacheStore::new()))
    }

    /// Create a role cache over a (possibly shared) backing store
    pub fn with_store(config: CacheConfig, store: Arc<dyn CacheStore<RoleSet>>) -> Self {
        Self { store, config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Prefix shared by every key this cache writes
    pub fn namespace_prefix(&self) -> String {
        format!("{}:", self.config.namespace)
    }

    /// Return the cached roles for `key`, computing and storing them on a miss
    pub async fn fetch<F, Fut>(&self, key: &RoleCacheKey, compute: F) -> Result<RoleSet>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<RoleSet>> + Send,
    {
        if !self.config.enabled {
            return compute().await;
        }

        let storage_key = key.storage_key(&self.config.namespace);
        let now = Instant::now();

        if let Some(entry) = self.store.read(&storage_key).await {
            if !entry.is_expired(now) {
                log::trace!("Role cache hit for {}", key);
                return Ok(entry.value);
            }

            let grace = self.config.race_condition_ttl();
            if !grace.is_zero() && entry.within_grace(now, grace) {
                let claimed = self.store.extend_expired(&storage_key, now, now + grace).await;
                if !claimed {
                    // Another caller is already refreshing this key
                    if let Some(current) = self.store.read(&storage_key).await {
                        log::trace!("Role cache serving {} during refresh", key);
                        return Ok(current.value);
                    }
                }
            }
        }

        log::trace!("Role cache miss for {}", key);
        let roles = compute().await?;
        self.store.write(&storage_key, CacheEntry::new(roles.clone(), self.config.ttl())).await;
        Ok(roles)
    }

    /// Drop the entries for `keys`; returns how many existed
    pub async fn delete(&self, keys: &[RoleCacheKey]) -> usize {
        if !self.config.enabled || keys.is_empty() {
            return 0;
        }

        let mut removed = 0;
        for key in keys {
            if self.store.delete(&key.storage_key(&self.config.namespace)).await {
                removed += 1;
            }
        }
        log::debug!("Role cache invalidated {} of {} keys", removed, keys.len());
        removed
    }

    /// Drop every entry in this cache's namespace, leaving other users of the store alone
    pub async fn clear(&self) -> usize {
        let removed = self.store.delete_prefixed(&self.namespace_prefix()).await;
        log::debug!("Role cache cleared {} entries", removed);
        removed
    }
}
