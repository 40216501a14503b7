//! Translation cache metrics.
//!
//! Counters are owned by a single cache instance so separate caches (and
//! separate tests) never share numbers.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct TranslationMetrics {
    /// Requests answered from a resolved cache entry
    cache_hits: AtomicUsize,

    /// Requests that found no entry and started a backend call
    cache_misses: AtomicUsize,

    /// Requests that attached to an in-flight backend call
    coalesced_waits: AtomicUsize,

    backend_calls: AtomicUsize,
    backend_failures: AtomicUsize,
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_coalesced_wait(&self) {
        self.coalesced_waits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_backend_call(&self) {
        self.backend_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_backend_failure(&self) {
        self.backend_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn coalesced_waits(&self) -> usize {
        self.coalesced_waits.load(Ordering::Relaxed)
    }

    pub fn backend_calls(&self) -> usize {
        self.backend_calls.load(Ordering::Relaxed)
    }

    pub fn backend_failures(&self) -> usize {
        self.backend_failures.load(Ordering::Relaxed)
    }

    /// Snapshot of the counters with derived rates.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let coalesced = self.coalesced_waits();
        let lookups = hits + misses + coalesced;
        let cache_hit_rate = if lookups > 0 {
            ((hits + coalesced) as f64 / lookups as f64) * 100.0
        } else {
            0.0
        };

        let calls = self.backend_calls();
        let failures = self.backend_failures();
        let backend_success_rate = if calls > 0 {
            (calls.saturating_sub(failures) as f64 / calls as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            coalesced_waits: coalesced,
            cache_hit_rate,
            backend_calls: calls,
            backend_failures: failures,
            backend_success_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub coalesced_waits: usize,

    /// Share of lookups that avoided a new backend call, as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub backend_calls: usize,
    pub backend_failures: usize,

    /// Backend success rate as a percentage (0-100)
    pub backend_success_rate: f64,
}
