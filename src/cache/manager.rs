//! File cache for storing serializable values on disk
//!
//! Provides a `FileCache` that writes one JSON record per key, named by the
//! MD5 digest of the key, with an optional expiry timestamp. Expired entries
//! are removed lazily when a read touches them.

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::path;
use super::record::{self, CacheRecord};
use crate::config::{normalize_dir, CacheConfig};
use crate::error::CacheError;

/// Outcome of looking a key up on disk
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// The entry exists and is fresh
    Hit(CacheRecord),
    /// No file exists for the key
    Missing,
    /// The entry had expired and its file has been removed
    Expired,
}

impl Lookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }

    /// Returns the unflattened value of a hit
    pub fn into_value(self) -> Option<Value> {
        match self {
            Lookup::Hit(record) => Some(record.value()),
            Lookup::Missing | Lookup::Expired => None,
        }
    }
}

/// Stores cached values as files in a single directory
///
/// Every operation is plain blocking file I/O with no locking. Two writers on
/// the same key race and the last one wins.
#[derive(Debug, Clone)]
pub struct FileCache {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl Default for FileCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FileCache {
    /// Creates a cache rooted at `storage/cache` under the working directory
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache with a custom cache directory
    pub fn with_dir(cache_dir: impl AsRef<Path>) -> Self {
        Self {
            cache_dir: normalize_dir(cache_dir.as_ref()),
        }
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            cache_dir: config.cache_dir,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Points this cache at a different directory.
    ///
    /// Entries written under the previous directory are left where they are
    /// and become unreachable through this instance.
    pub fn set_cache_dir(&mut self, dir: impl AsRef<Path>) {
        self.cache_dir = normalize_dir(dir.as_ref());
    }

    /// Returns the path to the cache file for `key`, creating the cache
    /// directory if it is missing
    pub fn resolve(&self, key: &str) -> PathBuf {
        path::ensure_dir(&self.cache_dir);
        path::resolve(&self.cache_dir, key)
    }

    /// Writes `value` under `key`, replacing any previous entry.
    ///
    /// A `ttl_seconds` of zero stores the entry without expiry.
    pub fn try_put<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> Result<(), CacheError> {
        let path = self.resolve(key);
        let value = serde_json::to_value(value)?;
        let record = CacheRecord::new(value, ttl_seconds, now());
        let content = record::encode(&record)?;

        fs::write(&path, content).map_err(|e| CacheError::io(&path, e))
    }

    /// Writes `value` under `key`. Returns `true` iff the write succeeded.
    pub fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl_seconds: u64) -> bool {
        match self.try_put(key, value, ttl_seconds) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to write cache entry");
                false
            }
        }
    }

    /// Reads the entry for `key`, distinguishing missing from expired.
    ///
    /// An expired entry is deleted before `Lookup::Expired` is returned.
    pub fn lookup(&self, key: &str) -> Result<Lookup, CacheError> {
        let path = self.resolve(key);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Lookup::Missing),
            Err(e) => return Err(CacheError::io(&path, e)),
        };
        let record = record::decode(&path, &content)?;

        if record.is_expired(now()) {
            tracing::debug!(key, "Evicting expired cache entry");
            self.forget(key);
            return Ok(Lookup::Expired);
        }

        Ok(Lookup::Hit(record))
    }

    /// Reads the value stored under `key`.
    ///
    /// Returns `None` if the entry is missing, expired, unreadable, or does not
    /// deserialize into `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let record = match self.lookup(key) {
            Ok(Lookup::Hit(record)) => record,
            Ok(Lookup::Missing | Lookup::Expired) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Treating unreadable cache entry as absent");
                return None;
            }
        };

        match record.deserialize() {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!(key, error = %e, "Cached value has an unexpected shape");
                None
            }
        }
    }

    /// Reads the value under `key`, or returns `default`
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Reads the value under `key`, or computes a default with `default`.
    ///
    /// `default` is only invoked when the entry is absent.
    pub fn get_or_else<T, F>(&self, key: &str, default: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        self.get(key).unwrap_or_else(default)
    }

    /// Returns the cached value, computing and storing it first if absent.
    ///
    /// The presence check and the write are separate steps, so concurrent
    /// callers may both compute and both write.
    pub fn remember<T, F>(&self, key: &str, ttl_seconds: u64, default: F) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        if self.has(key) {
            if let Some(value) = self.get(key) {
                return value;
            }
        }

        let value = default();
        self.put(key, &value, ttl_seconds);
        self.get(key).unwrap_or(value)
    }

    /// Returns the value under `key` and removes the entry.
    ///
    /// An entry that does not deserialize into `T` is left in place. Corrupt
    /// records are removed.
    pub fn pull<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.lookup(key) {
            Ok(Lookup::Hit(record)) => match record.deserialize() {
                Ok(data) => {
                    self.forget(key);
                    Some(data)
                }
                Err(e) => {
                    tracing::warn!(key, error = %e, "Cached value has an unexpected shape");
                    None
                }
            },
            Ok(Lookup::Missing | Lookup::Expired) => None,
            Err(e @ CacheError::Corrupt { .. }) => {
                tracing::warn!(key, error = %e, "Discarding corrupt cache entry");
                self.forget(key);
                None
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read cache entry");
                None
            }
        }
    }

    /// Like `pull`, but computes a default when nothing was stored
    pub fn pull_or_else<T, F>(&self, key: &str, default: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        self.pull(key).unwrap_or_else(default)
    }

    /// Whether a fresh entry exists for `key`.
    ///
    /// Expired entries are evicted and reported as absent.
    pub fn has(&self, key: &str) -> bool {
        self.lookup(key).is_ok_and(|lookup| lookup.is_hit())
    }

    /// Deletes the entry for `key`.
    ///
    /// Returns `Ok(true)` if a file was removed and `Ok(false)` if there was
    /// nothing to remove.
    pub fn try_forget(&self, key: &str) -> Result<bool, CacheError> {
        let path = self.resolve(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::io(&path, e)),
        }
    }

    /// Deletes the entry for `key`. Returns `true` iff no file remains.
    pub fn forget(&self, key: &str) -> bool {
        if let Err(e) = self.try_forget(key) {
            tracing::warn!(key, error = %e, "Failed to delete cache entry");
        }
        !path::resolve(&self.cache_dir, key).exists()
    }

    /// Deletes every non-hidden entry in the cache directory.
    ///
    /// The directory itself is kept. Entries that fail to delete are logged
    /// and skipped. Returns the number of entries removed.
    pub fn try_clear(&self) -> Result<usize, CacheError> {
        let entries =
            fs::read_dir(&self.cache_dir).map_err(|e| CacheError::io(&self.cache_dir, e))?;

        let mut removed = 0;
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read cache directory entry");
                    continue;
                }
            };
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }

            let path = entry.path();
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to delete cache entry"
                    );
                }
            }
        }

        tracing::debug!(removed, dir = %self.cache_dir.display(), "Cleared cache directory");
        Ok(removed)
    }

    /// Deletes every non-hidden entry and returns how many were removed
    pub fn clear(&self) -> usize {
        self.try_clear().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to clear cache directory");
            0
        })
    }
}

/// Clears `cache` and terminates the process with exit status 0.
///
/// For application entry points that want a "wipe the cache and stop" command;
/// library code should call `FileCache::clear` instead.
pub fn clear_and_exit(cache: &FileCache) -> ! {
    cache.clear();
    std::process::exit(0)
}

fn now() -> i64 {
    Utc::now().timestamp()
}
