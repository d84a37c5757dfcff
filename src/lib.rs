//! filecacher
//!
//! A minimal file-backed key/value cache with optional per-entry expiry.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{clear_and_exit, CacheRecord, FileCache, Lookup};
pub use config::CacheConfig;
pub use error::CacheError;
