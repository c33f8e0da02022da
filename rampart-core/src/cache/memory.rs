//! In-process cache store
//!
//! Backed by a sharded lock-free `scc::HashMap`, so lookups for different keys
//! never contend. Clones share the same underlying map.

use super::traits::{CacheEntry, CacheStore};
use scc::hash_map::Entry;
use scc::HashMap as SccHashMap;
use std::sync::Arc;
use std::time::Instant;

/// In-memory cache store
pub struct MemoryCacheStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    map: Arc<SccHashMap<String, CacheEntry<V>>>,
}

impl<V> MemoryCacheStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self { map: Arc::new(SccHashMap::new()) }
    }
}

impl<V> Default for MemoryCacheStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for MemoryCacheStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self { map: Arc::clone(&self.map) }
    }
}

#[async_trait::async_trait]
impl<V> CacheStore<V> for MemoryCacheStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn read(&self, key: &str) -> Option<CacheEntry<V>> {
        self.map.read_async(key, |_k, entry| entry.clone()).await
    }

    async fn write(&self, key: &str, entry: CacheEntry<V>) {
        match self.map.entry_async(key.to_string()).await {
            Entry::Occupied(mut occupied) => {
                *occupied.get_mut() = entry;
            }
            Entry::Vacant(vacant) => {
                vacant.insert_entry(entry);
            }
        }
    }

    async fn extend_expired(&self, key: &str, now: Instant, until: Instant) -> bool {
        match self.map.entry_async(key.to_string()).await {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if !entry.is_expired(now) {
                    return false;
                }
                entry.expires_at = Some(until);
                true
            }
            Entry::Vacant(_) => false,
        }
    }

    async fn delete(&self, key: &str) -> bool {
        self.map.remove_async(key).await.is_some()
    }

    async fn delete_prefixed(&self, prefix: &str) -> usize {
        let mut removed = 0;
        self.map
            .retain_async(|k, _| {
                if k.starts_with(prefix) {
                    removed += 1;
                    false
                } else {
                    true
                }
            })
            .await;
        removed
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}
