//! Maps cache keys to file paths

use md5::{Digest, Md5};
use std::fs;
use std::path::{Path, PathBuf};

/// Returns the file name for a key: the lowercase hex MD5 digest of its bytes
pub fn hash_key(key: &str) -> String {
    hex::encode(Md5::digest(key.as_bytes()))
}

/// Returns the path of the cache file for `key` inside `cache_dir`
pub fn resolve(cache_dir: &Path, key: &str) -> PathBuf {
    cache_dir.join(hash_key(key))
}

/// Creates the directory chain for `cache_dir`, one segment at a time.
///
/// Failures are logged and otherwise ignored; a directory that could not be
/// created shows up as an error on the following write.
pub fn ensure_dir(cache_dir: &Path) {
    let mut current = PathBuf::new();
    for component in cache_dir.components() {
        current.push(component);
        if current.is_dir() {
            continue;
        }
        if let Err(e) = fs::create_dir(&current) {
            tracing::debug!(
                path = %current.display(),
                error = %e,
                "Failed to create cache directory"
            );
            return;
        }
    }
}
