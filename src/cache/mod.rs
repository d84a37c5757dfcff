//! File-backed cache storage
//!
//! Each entry is a JSON record in its own file, named by the MD5 digest of the
//! key. Entries may carry an expiry timestamp; expired entries are removed the
//! next time a read touches them.

mod manager;
pub mod path;
pub mod record;

pub use manager::{clear_and_exit, FileCache, Lookup};
pub use record::CacheRecord;
