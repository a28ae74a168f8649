//! Cache Module
//!
//! Disk-backed document cache with TTL freshness and a sweep for stale entries.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, IndexRecord};
pub use stats::CacheStats;
pub use store::{CacheConfig, ContentCache};

// == Public Constants ==
/// Name of the metadata index inside the cache directory
pub const INDEX_FILE: &str = "index.json";

/// Extension of cached document files
pub const DOCUMENT_EXTENSION: &str = "html";
