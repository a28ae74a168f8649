//! Cache Entry Module
//!
//! Freshness metadata for one cached document.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// == Index Record ==
/// On-disk metadata stored per key in `index.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRecord {
    /// Entity name the document was fetched for
    pub source_name: String,
    /// When the document was stored (ISO 8601)
    pub timestamp: DateTime<Utc>,
    /// Document size in bytes
    pub byte_size: u64,
}

// == Cache Entry ==
/// A cached document's metadata combined with the cache's TTL.
///
/// Entries are never mutated; a refresh replaces the record under the same key.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub source_name: String,
    pub stored_at: DateTime<Utc>,
    pub size_bytes: u64,
    pub ttl: Duration,
}

impl CacheEntry {
    // == Constructor ==
    pub fn from_record(key: impl Into<String>, record: &IndexRecord, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            source_name: record.source_name.clone(),
            stored_at: record.timestamp,
            size_bytes: record.byte_size,
            ttl,
        }
    }

    // == Validity ==
    /// Valid iff `now - stored_at < ttl`.
    ///
    /// A zero TTL is never valid. A `stored_at` in the future (clock skew)
    /// counts as fresh.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.stored_at);
        match chrono::Duration::from_std(self.ttl) {
            Ok(ttl) => age < ttl,
            // TTL too large to represent: never expires
            Err(_) => true,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Instant after which the entry is stale.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| self.stored_at.checked_add_signed(ttl))
    }

    // == Time To Live ==
    /// Remaining freshness, zero once stale.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at()
            .and_then(|expires| expires.signed_duration_since(Utc::now()).to_std().ok())
            .unwrap_or(Duration::ZERO)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn entry_stored(stored_at: DateTime<Utc>, ttl_secs: u64) -> CacheEntry {
        CacheEntry {
            key: "champion_ahri".to_string(),
            source_name: "Ahri".to_string(),
            stored_at,
            size_bytes: 42,
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    #[test]
    fn test_fresh_entry_is_valid() {
        let entry = entry_stored(Utc::now(), 60);
        assert!(entry.is_valid());
    }

    #[test]
    fn test_validity_boundary() {
        let stored = Utc::now();
        let entry = entry_stored(stored, 60);

        let just_before = stored + chrono::Duration::seconds(59);
        let exactly = stored + chrono::Duration::seconds(60);
        assert!(entry.is_valid_at(just_before));
        assert!(!entry.is_valid_at(exactly), "Entry should be stale once ttl has elapsed");
    }

    #[test]
    fn test_zero_ttl_never_valid() {
        let stored = Utc::now();
        let entry = entry_stored(stored, 0);
        assert!(!entry.is_valid_at(stored));
    }

    #[test]
    fn test_future_timestamp_is_valid() {
        let entry = entry_stored(Utc::now() + chrono::Duration::hours(1), 60);
        assert!(entry.is_valid());
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = entry_stored(Utc::now(), 10);
        let remaining = entry.ttl_remaining();
        assert!(remaining <= Duration::from_secs(10));
        assert!(remaining >= Duration::from_secs(9));
    }

    #[test]
    fn test_ttl_remaining_stale() {
        let entry = entry_stored(Utc::now() - chrono::Duration::seconds(30), 10);
        assert_eq!(entry.ttl_remaining(), Duration::ZERO);
    }

    #[test]
    fn test_index_record_json_shape() {
        let record = IndexRecord {
            source_name: "Kai'Sa".to_string(),
            timestamp: "2024-05-01T12:00:00Z".parse().unwrap(),
            byte_size: 1024,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["sourceName"], "Kai'Sa");
        assert_eq!(json["byteSize"], 1024);
        assert!(json["timestamp"].as_str().unwrap().starts_with("2024-05-01T12:00:00"));
    }
}
