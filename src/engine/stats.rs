// Fetch statistics for cache effectiveness and upstream request volume.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, PartialEq)]
pub struct FetchStatsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub source_requests: u64,
    pub pages_loaded: u64,
    pub superseded: u64,
    pub cache_hit_rate: f64,
}

pub struct FetchStats {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    source_requests: AtomicU64,
    pages_loaded: AtomicU64,
    superseded: AtomicU64,
}

impl FetchStats {
    pub fn new() -> Self {
        Self {
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            source_requests: AtomicU64::new(0),
            pages_loaded: AtomicU64::new(0),
            superseded: AtomicU64::new(0),
        }
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// One per-category round trip to the content source.
    pub fn record_source_request(&self) {
        self.source_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_page_loaded(&self) {
        self.pages_loaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_superseded(&self) {
        self.superseded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> FetchStatsSnapshot {
        let cache_hits = self.cache_hits.load(Ordering::Relaxed);
        let cache_misses = self.cache_misses.load(Ordering::Relaxed);
        let lookups = cache_hits + cache_misses;
        let cache_hit_rate = if lookups > 0 {
            cache_hits as f64 / lookups as f64
        } else {
            0.0
        };

        FetchStatsSnapshot {
            cache_hits,
            cache_misses,
            source_requests: self.source_requests.load(Ordering::Relaxed),
            pages_loaded: self.pages_loaded.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
            cache_hit_rate,
        }
    }
}

impl Default for FetchStats {
    fn default() -> Self {
        Self::new()
    }
}
