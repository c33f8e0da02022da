//! Core traits for caching functionality

use std::time::{Duration, Instant};

/// A cache entry with expiry metadata
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cached value
    pub value: V,

    /// When this entry was written
    pub created_at: Instant,

    /// When this entry stops being live; `None` never expires
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    /// Create a new cache entry living for `ttl` (forever when `None`)
    pub fn new(value: V, ttl: Option<Duration>) -> Self {
        let now = Instant::now();
        Self { value, created_at: now, expires_at: ttl.map(|ttl| now + ttl) }
    }

    /// Check if this entry is expired at `now`
    pub fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(at) if now >= at)
    }

    /// Whether `now` still falls inside the grace window following expiry
    pub fn within_grace(&self, now: Instant, grace: Duration) -> bool {
        match self.expires_at {
            Some(at) => now < at + grace,
            None => true,
        }
    }
}

/// Shared backing store for cached values
///
/// Keys are opaque strings; callers that share one store keep out of each
/// other's way by prefixing their keys with a namespace.
#[async_trait::async_trait]
pub trait CacheStore<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    /// Get an entry, live or expired
    async fn read(&self, key: &str) -> Option<CacheEntry<V>>;

    /// Insert or replace an entry
    async fn write(&self, key: &str, entry: CacheEntry<V>);

    /// Atomically move the expiry of an already expired entry to `until`.
    ///
    /// Returns `false` when the entry is missing or live at `now`, which means
    /// another caller has already claimed the refresh.
    async fn extend_expired(&self, key: &str, now: Instant, until: Instant) -> bool;

    /// Remove an entry, returning whether it existed
    async fn delete(&self, key: &str) -> bool;

    /// Remove every entry whose key starts with `prefix`
    async fn delete_prefixed(&self, prefix: &str) -> usize;

    /// Number of entries currently held
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
