//! Role caching
//!
//! Resolving a principal's roles in a context usually costs a round trip to the
//! role store, so results are memoized per `(principal, context)` pair in a
//! shared backing store. Entries are never evicted by size; they go away when
//! the owning principal's roles change in that context, when the namespace is
//! cleared, or when their TTL runs out.

pub mod key;
pub mod memory;
pub mod role_cache;
pub mod traits;

pub use key::RoleCacheKey;
pub use memory::MemoryCacheStore;
pub use role_cache::RoleCache;
pub use traits::{CacheEntry, CacheStore};
