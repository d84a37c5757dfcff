//! Cache configuration
//!
//! The base directory is carried by value inside each `FileCache`, so separate
//! instances can point at separate directories.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory used when none is configured, relative to the working directory
pub const DEFAULT_CACHE_DIR: &str = "storage/cache";

/// Configuration for a `FileCache`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding one file per cache key
    pub cache_dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }
}

impl CacheConfig {
    /// Returns a copy of this config pointing at `dir`
    pub fn with_cache_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cache_dir = normalize_dir(dir.as_ref());
        self
    }
}

/// Strips trailing separators and falls back to the default for empty input.
///
/// Both `/` and `\` count as separators here, so `"storage/cache/"` and
/// `"storage\\cache\\"` name the same directory as `"storage/cache"`.
pub(crate) fn normalize_dir(dir: &Path) -> PathBuf {
    let raw = dir.to_string_lossy();
    let trimmed = raw.trim_end_matches(['/', '\\']);

    if trimmed.is_empty() {
        // "/" alone trims to nothing but still means the root
        if raw.starts_with('/') {
            return PathBuf::from("/");
        }
        return PathBuf::from(DEFAULT_CACHE_DIR);
    }

    PathBuf::from(trimmed)
}
