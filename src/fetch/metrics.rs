//! Fetch Metrics Module
//!
//! Tracks process-lifetime fetch counters: requests, cache hits/misses,
//! outcomes and latency.

use std::time::Duration;

use serde::Serialize;

// == Fetch Metrics ==
/// Counters updated once per terminal outcome of a logical fetch.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FetchMetrics {
    /// Logical network fetches (retries not counted)
    pub total_requests: u64,
    /// Document lookups answered from the cache
    pub cache_hits: u64,
    /// Document lookups that fell through to the network
    pub cache_misses: u64,
    /// Fetches that returned a document
    pub successes: u64,
    /// Fetches that ended in an error
    pub failures: u64,
    /// HTTP attempts beyond the first, summed over all fetches
    pub retries: u64,
    /// Summed wall-clock latency of all logical fetches
    pub total_latency_ms: u64,
}

impl FetchMetrics {
    // == Constructor ==
    /// Creates a new FetchMetrics with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Average Latency ==
    /// Mean latency per logical fetch, or 0.0 before the first fetch.
    pub fn average_latency_ms(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.total_latency_ms as f64 / self.total_requests as f64
        }
    }

    // == Hit Rate ==
    /// Returns cache_hits / (cache_hits + cache_misses), or 0.0 without lookups.
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }

    // == Record Outcome ==
    /// Records a successful fetch and the retries it needed.
    pub fn record_success(&mut self, latency: Duration, retries: u32) {
        self.record_request(latency, retries);
        self.successes += 1;
    }

    /// Records a failed fetch and the retries it burned.
    pub fn record_failure(&mut self, latency: Duration, retries: u32) {
        self.record_request(latency, retries);
        self.failures += 1;
    }

    fn record_request(&mut self, latency: Duration, retries: u32) {
        self.total_requests += 1;
        self.retries += u64::from(retries);
        self.total_latency_ms += latency.as_millis() as u64;
    }

    // == Record Cache Lookup ==
    /// Increments the cache hit counter.
    pub fn record_cache_hit(&mut self) {
        self.cache_hits += 1;
    }

    /// Increments the cache miss counter.
    pub fn record_cache_miss(&mut self) {
        self.cache_misses += 1;
    }
}
