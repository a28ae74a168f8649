//! Content Cache Module
//!
//! Disk-backed document cache: one file per key plus a JSON metadata index
//! that is the sole authority on freshness.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheStats, IndexRecord, DOCUMENT_EXTENSION, INDEX_FILE};
use crate::error::CacheError;

type Index = BTreeMap<String, IndexRecord>;

// == Cache Config ==
/// Construction parameters for a `ContentCache`.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Directory holding documents and the index, created on first put
    pub dir: PathBuf,
    /// Freshness window applied to every entry
    pub ttl: Duration,
    /// When false every lookup misses and puts are dropped
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".cache/wiki_stats"),
            ttl: Duration::from_secs(24 * 60 * 60),
            enabled: true,
        }
    }
}

// == Content Cache ==
/// Best-effort freshness layer in front of the fetch client.
///
/// All methods do blocking file IO. The index read-modify-write in `put` and
/// `sweep` is serialized; per-key writers are assumed to be single.
#[derive(Debug)]
pub struct ContentCache {
    config: CacheConfig,
    index_lock: Mutex<()>,
}

impl ContentCache {
    // == Constructor ==
    /// Creates a cache over `config.dir`. Nothing touches the disk yet.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            index_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn document_path(&self, key: &str) -> PathBuf {
        self.config
            .dir
            .join(format!("{}.{}", key, DOCUMENT_EXTENSION))
    }

    fn index_path(&self) -> PathBuf {
        self.config.dir.join(INDEX_FILE)
    }

    // == Is Valid ==
    /// True iff the index holds a record for `key` inside its TTL.
    pub fn is_valid(&self, key: &str) -> bool {
        self.entry(key).map(|e| e.is_valid()).unwrap_or(false)
    }

    // == Get ==
    /// Returns the stored document if its entry is valid.
    ///
    /// Misses have no side effects. IO failures are logged and reported as
    /// misses.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let entry = self.entry(key)?;
        if !entry.is_valid() {
            debug!(key, stored_at = %entry.stored_at, "Cache entry stale");
            return None;
        }

        let path = self.document_path(key);
        match fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(key, error = %CacheError::io(&path, e), "Failed to read cached document");
                None
            }
        }
    }

    // == Put ==
    /// Stores `document` under `key`, replacing any previous entry.
    pub fn put(&self, key: &str, source_name: &str, document: &[u8]) -> Result<(), CacheError> {
        self.put_at(key, source_name, document, Utc::now())
    }

    pub(crate) fn put_at(
        &self,
        key: &str,
        source_name: &str,
        document: &[u8],
        stored_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        if !self.config.enabled {
            return Ok(());
        }
        validate_key(key)?;

        // Held across the document write so a sweep cannot delete it before
        // its fresh record lands in the index
        let _guard = self.index_lock.lock();

        fs::create_dir_all(&self.config.dir).map_err(|e| CacheError::io(&self.config.dir, e))?;

        let path = self.document_path(key);
        write_atomic(&path, document)?;

        let mut index = self.read_index();
        index.insert(
            key.to_string(),
            IndexRecord {
                source_name: source_name.to_string(),
                timestamp: stored_at,
                byte_size: document.len() as u64,
            },
        );
        self.write_index(&index)?;

        debug!(key, bytes = document.len(), "Cached document");
        Ok(())
    }

    // == Sweep ==
    /// Deletes documents whose validity window has elapsed.
    ///
    /// A file that fails to delete is logged and keeps its index record so a
    /// later sweep retries it; the remaining entries are still processed.
    /// Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        if !self.config.enabled {
            return 0;
        }

        let _guard = self.index_lock.lock();
        let mut index = match self.load_index() {
            Ok(index) => index,
            Err(e) => {
                warn!(error = %e, "Skipping sweep, cache index unreadable");
                return 0;
            }
        };

        let now = Utc::now();
        let expired: Vec<String> = index
            .iter()
            .filter(|(key, record)| {
                !CacheEntry::from_record(key.as_str(), record, self.config.ttl).is_valid_at(now)
            })
            .map(|(key, _)| key.clone())
            .collect();

        let mut removed = 0;
        for key in expired {
            let path = self.document_path(&key);
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    let error = CacheError::io(&path, e);
                    warn!(key, error = %error, "Failed to delete stale document");
                    continue;
                }
            }
            index.remove(&key);
            removed += 1;
        }

        if removed > 0 {
            if let Err(e) = self.write_index(&index) {
                warn!(error = %e, "Failed to rewrite cache index after sweep");
            }
            info!(removed, "Cache sweep removed stale entries");
        }

        removed
    }

    // == Entries ==
    /// Metadata for `key`, fresh or stale.
    pub fn entry(&self, key: &str) -> Option<CacheEntry> {
        if !self.config.enabled {
            return None;
        }
        self.read_index()
            .get(key)
            .map(|record| CacheEntry::from_record(key, record, self.config.ttl))
    }

    /// All indexed entries ordered by key.
    pub fn entries(&self) -> Vec<CacheEntry> {
        if !self.config.enabled {
            return Vec::new();
        }
        self.read_index()
            .iter()
            .map(|(key, record)| CacheEntry::from_record(key.as_str(), record, self.config.ttl))
            .collect()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats::from_entries(&self.entries())
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Index IO ==
    fn load_index(&self) -> Result<Index, CacheError> {
        let path = self.index_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Index::new()),
            Err(e) => return Err(CacheError::io(&path, e)),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    /// Index for lookups; an unreadable index behaves as empty.
    fn read_index(&self) -> Index {
        self.load_index().unwrap_or_else(|e| {
            warn!(error = %e, "Cache index unreadable, treating as empty");
            Index::new()
        })
    }

    fn write_index(&self, index: &Index) -> Result<(), CacheError> {
        let json = serde_json::to_vec_pretty(index)?;
        write_atomic(&self.index_path(), &json)
    }
}

/// Writes `bytes` beside `path` and renames into place so readers never see a
/// partial file.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CacheError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes).map_err(|e| CacheError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| CacheError::io(path, e))
}

fn validate_key(key: &str) -> Result<(), CacheError> {
    let escapes = key.contains(['/', '\\']) || key.contains("..") || Path::new(key).is_absolute();
    if key.is_empty() || escapes {
        return Err(CacheError::InvalidKey(key.to_string()));
    }
    Ok(())
}
