//! Cache Statistics Module
//!
//! Point-in-time summary of the on-disk content cache.

use serde::Serialize;

use crate::cache::CacheEntry;

// == Cache Stats ==
/// Summary computed from the metadata index.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    /// Records in the index, fresh or stale
    pub total_entries: usize,
    /// Records still inside their TTL
    pub valid_entries: usize,
    /// Summed document size of all records
    pub total_bytes: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == From Entries ==
    pub fn from_entries(entries: &[CacheEntry]) -> Self {
        let mut stats = Self::new();
        for entry in entries {
            stats.total_entries += 1;
            stats.total_bytes += entry.size_bytes;
            if entry.is_valid() {
                stats.valid_entries += 1;
            }
        }
        stats
    }

    // == Stale Entries ==
    /// Records a sweep would remove right now.
    pub fn stale_entries(&self) -> usize {
        self.total_entries - self.valid_entries
    }
}
