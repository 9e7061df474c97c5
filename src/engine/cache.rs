// In-memory result cache with per-entry time-to-live and lazy expiry.

use std::hash::Hash;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) >= ttl
    }
}

/// Thread-safe key/value store whose entries expire `ttl` after being set.
///
/// Backed by a sharded map, so a read only contends with writers to the same shard.
/// There is no size bound; entries leave on expiry, `remove`, or `purge_expired`.
pub struct ExpiringCache<K, V> {
    entries: DashMap<K, CacheEntry<V>>,
    ttl: Duration,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Store `value` under `key`, replacing any existing entry and restarting its TTL.
    pub fn set(&self, key: K, value: V) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Return a copy of the value if it is still fresh. A stale entry is dropped.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        {
            let entry = self.entries.get(key)?;
            if !entry.is_expired(self.ttl, now) {
                return Some(entry.value.clone());
            }
        }

        // Shard guard released above; re-check in case a writer refreshed the entry.
        self.entries
            .remove_if(key, |_, entry| entry.is_expired(self.ttl, now));
        None
    }

    pub fn remove(&self, key: &K) {
        self.entries.remove(key);
    }

    /// Drop every expired entry. Never changes what `get` would return.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| !entry.is_expired(self.ttl, now));
        before.saturating_sub(self.entries.len())
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, including ones that expired but were not yet dropped.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
