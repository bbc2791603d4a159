use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 缓存命中统计
#[derive(Clone, Default)]
pub struct CacheStats {
    counters: Arc<Counters>,
}

#[derive(Default)]
struct Counters {
    hits: AtomicUsize,
    misses: AtomicUsize,
    writes: AtomicUsize,
    errors: AtomicUsize,
}

/// 缓存统计快照
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CacheStatsSnapshot {
    pub hits: usize,
    pub misses: usize,
    pub writes: usize,
    pub errors: usize,
    /// 命中率（0.0 ~ 1.0）
    pub hit_rate: f64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self, category: &str) {
        self.counters.hits.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(category, "cache hit");
    }

    pub fn record_miss(&self, category: &str) {
        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(category, "cache miss");
    }

    pub fn record_write(&self, category: &str) {
        self.counters.writes.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(category, "cache write");
    }

    pub fn record_error(&self, category: &str, error: &str) {
        self.counters.errors.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(category, error, "cache error");
    }

    pub fn snapshot(&self) -> CacheStatsSnapshot {
        let hits = self.counters.hits.load(Ordering::Relaxed);
        let misses = self.counters.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        CacheStatsSnapshot {
            hits,
            misses,
            writes: self.counters.writes.load(Ordering::Relaxed),
            errors: self.counters.errors.load(Ordering::Relaxed),
            hit_rate: if lookups == 0 {
                0.0
            } else {
                hits as f64 / lookups as f64
            },
        }
    }
}
