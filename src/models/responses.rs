//! Response DTOs for the stats API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{CacheEntry, CacheStats};
use crate::engine::EntityStats;
use crate::entity::EntityKind;
use crate::fetch::FetchMetrics;
use crate::formula::StatFormula;

/// Response body for `GET /entities/:kind/:name`
#[derive(Debug, Clone, Serialize)]
pub struct EntityStatsResponse {
    #[serde(flatten)]
    pub stats: EntityStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    /// Value of every form of every stat at `level`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<BTreeMap<String, Vec<f64>>>,
}

impl EntityStatsResponse {
    pub fn new(stats: EntityStats) -> Self {
        Self {
            stats,
            level: None,
            values: None,
        }
    }

    pub fn with_values(mut self, level: u32, values: BTreeMap<String, Vec<f64>>) -> Self {
        self.level = Some(level);
        self.values = Some(values);
        self
    }
}

/// Response body for `GET /entities/:kind/:name/progression`
#[derive(Debug, Clone, Serialize)]
pub struct ProgressionResponse {
    pub kind: EntityKind,
    pub name: String,
    pub stat: String,
    pub formula: StatFormula,
    /// Value per level, keyed by level
    pub values: BTreeMap<u8, f64>,
}

/// Response body for `POST /evaluate`
#[derive(Debug, Clone, Serialize)]
pub struct EvaluateResponse {
    pub level: u32,
    pub values: BTreeMap<String, f64>,
    /// Stats left out because their formula could not be evaluated
    pub skipped: Vec<String>,
}

impl EvaluateResponse {
    pub fn new<'a>(
        level: u32,
        values: BTreeMap<String, f64>,
        requested: impl IntoIterator<Item = &'a String>,
    ) -> Self {
        let skipped = requested
            .into_iter()
            .filter(|name| !values.contains_key(*name))
            .cloned()
            .collect();
        Self {
            level,
            values,
            skipped,
        }
    }
}

/// Response body for `POST /cache/sweep`
#[derive(Debug, Clone, Serialize)]
pub struct SweepResponse {
    pub removed: usize,
}

/// One row of `GET /cache`
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntryResponse {
    pub key: String,
    pub source_name: String,
    pub stored_at: DateTime<Utc>,
    pub size_bytes: u64,
    pub valid: bool,
    pub ttl_remaining_secs: u64,
}

impl From<&CacheEntry> for CacheEntryResponse {
    fn from(entry: &CacheEntry) -> Self {
        Self {
            key: entry.key.clone(),
            source_name: entry.source_name.clone(),
            stored_at: entry.stored_at,
            size_bytes: entry.size_bytes,
            valid: entry.is_valid(),
            ttl_remaining_secs: entry.ttl_remaining().as_secs(),
        }
    }
}

/// Response body for `GET /cache`
#[derive(Debug, Clone, Serialize)]
pub struct CacheListResponse {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub total_bytes: u64,
    pub entries: Vec<CacheEntryResponse>,
}

impl CacheListResponse {
    pub fn new(entries: &[CacheEntry]) -> Self {
        let stats = CacheStats::from_entries(entries);
        Self {
            total_entries: stats.total_entries,
            valid_entries: stats.valid_entries,
            total_bytes: stats.total_bytes,
            entries: entries.iter().map(CacheEntryResponse::from).collect(),
        }
    }
}

/// Response body for `GET /metrics`
#[derive(Debug, Clone, Serialize)]
pub struct MetricsResponse {
    #[serde(flatten)]
    pub fetch: FetchMetrics,
    pub average_latency_ms: f64,
    pub hit_rate: f64,
    pub cached_entries: usize,
    pub valid_entries: usize,
    pub cache_bytes: u64,
}

impl MetricsResponse {
    pub fn new(fetch: FetchMetrics, cache: CacheStats) -> Self {
        Self {
            average_latency_ms: fetch.average_latency_ms(),
            hit_rate: fetch.hit_rate(),
            fetch,
            cached_entries: cache.total_entries,
            valid_entries: cache.valid_entries,
            cache_bytes: cache.total_bytes,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample_stats() -> EntityStats {
        let mut formulas = BTreeMap::new();
        formulas.insert("hp".to_string(), vec![StatFormula::linear(645.0, 99.0)]);
        EntityStats {
            kind: EntityKind::Champion,
            name: "Annie".to_string(),
            key: "champion_annie".to_string(),
            url: "https://wiki.test/Annie/LoL".to_string(),
            from_cache: false,
            formulas,
        }
    }

    #[test]
    fn test_entity_response_flattens_stats() {
        let json = serde_json::to_value(EntityStatsResponse::new(sample_stats())).unwrap();
        assert_eq!(json["kind"], "champion");
        assert_eq!(json["formulas"]["hp"][0]["base_value"], 645.0);
        assert!(json.get("level").is_none());
        assert!(json.get("values").is_none());
    }

    #[test]
    fn test_entity_response_with_values() {
        let mut values = BTreeMap::new();
        values.insert("hp".to_string(), vec![2328.0]);
        let resp = EntityStatsResponse::new(sample_stats()).with_values(18, values);
        let json = serde_json::to_value(resp).unwrap();
        assert_eq!(json["level"], 18);
        assert_eq!(json["values"]["hp"][0], 2328.0);
    }

    #[test]
    fn test_evaluate_response_lists_skipped() {
        let requested = vec!["armor".to_string(), "hp".to_string()];
        let mut values = BTreeMap::new();
        values.insert("hp".to_string(), 2328.0);

        let resp = EvaluateResponse::new(18, values, &requested);
        assert_eq!(resp.skipped, vec!["armor".to_string()]);
    }

    #[test]
    fn test_cache_entry_response() {
        let entry = CacheEntry {
            key: "item_boots".to_string(),
            source_name: "Boots".to_string(),
            stored_at: Utc::now(),
            size_bytes: 42,
            ttl: Duration::from_secs(60),
        };
        let list = CacheListResponse::new(&[entry]);
        assert_eq!(list.total_entries, 1);
        assert_eq!(list.valid_entries, 1);
        assert_eq!(list.total_bytes, 42);
        assert!(list.entries[0].valid);
        assert!(list.entries[0].ttl_remaining_secs <= 60);
    }

    #[test]
    fn test_metrics_response_derived_fields() {
        let fetch = FetchMetrics {
            cache_hits: 3,
            cache_misses: 1,
            successes: 2,
            total_latency_ms: 300,
            ..FetchMetrics::default()
        };
        let resp = MetricsResponse::new(fetch, CacheStats::new());
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["cache_hits"], 3);
        assert!((resp.hit_rate - 0.75).abs() < 0.001);
        assert_eq!(json["cached_entries"], 0);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
