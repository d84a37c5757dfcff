//! The envelope written to disk for each cache entry

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::error::CacheError;

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Unix timestamp of the write
    pub created_at: i64,
    /// Scalars as-is; arrays and objects as a nested JSON string
    pub data: Value,
    /// Unix timestamp after which the entry is stale, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_at: Option<i64>,
}

impl CacheRecord {
    /// Builds a record for `value` written at `now`.
    ///
    /// A `ttl_seconds` of zero means the entry never expires.
    pub fn new(value: Value, ttl_seconds: u64, now: i64) -> Self {
        let data = match value {
            Value::Array(_) | Value::Object(_) => Value::String(value.to_string()),
            scalar => scalar,
        };
        let expire_at = match ttl_seconds {
            0 => None,
            ttl => Some(now.saturating_add(i64::try_from(ttl).unwrap_or(i64::MAX))),
        };

        Self {
            created_at: now,
            data,
            expire_at,
        }
    }

    /// Whether the entry is stale at `now`
    pub fn is_expired(&self, now: i64) -> bool {
        self.expire_at.is_some_and(|at| at <= now)
    }

    /// Returns the stored value, unflattening nested JSON strings.
    ///
    /// A string that does not parse as a JSON array or object is returned raw.
    pub fn value(&self) -> Value {
        if let Value::String(raw) = &self.data {
            if let Ok(parsed @ (Value::Array(_) | Value::Object(_))) =
                serde_json::from_str::<Value>(raw)
            {
                return parsed;
            }
        }
        self.data.clone()
    }

    /// Converts the stored value into `T`.
    ///
    /// The unflattened form is tried first. A string whose text happens to be
    /// JSON is still readable as a string through the raw `data`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match serde_json::from_value(self.value()) {
            Ok(data) => Ok(data),
            Err(e) if self.data.is_string() => {
                serde_json::from_value(self.data.clone()).map_err(|_| e)
            }
            Err(e) => Err(e),
        }
    }

    /// Consumes the record, returning the value and its expiry
    pub fn into_parts(self) -> (Value, Option<i64>) {
        (self.value(), self.expire_at)
    }
}

/// Serializes a record to the text stored on disk
pub fn encode(record: &CacheRecord) -> Result<String, CacheError> {
    Ok(serde_json::to_string(record)?)
}

/// Parses the text of a cache file read from `path`
pub fn decode(path: &Path, content: &str) -> Result<CacheRecord, CacheError> {
    serde_json::from_str(content).map_err(|source| CacheError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}
