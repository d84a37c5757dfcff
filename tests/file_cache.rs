//! Integration tests for the public cache API
//!
//! Exercises the cache end to end through the crate root, the way an
//! application would use it.

use std::fs;
use std::thread;
use std::time::Duration;

use filecacher::{CacheConfig, FileCache, Lookup};
use serde_json::{json, Value};
use tempfile::TempDir;

fn create_test_cache() -> (FileCache, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config = CacheConfig::default().with_cache_dir(temp_dir.path());
    (FileCache::with_config(config), temp_dir)
}

#[test]
fn test_user_record_lifecycle() {
    let (cache, temp_dir) = create_test_cache();

    assert!(cache.put("user:1", &json!({"name": "Ann"}), 0));
    assert!(
        temp_dir.path().join("bdb1dd105679979ca82b28edd1c8ccd2").exists(),
        "File should be named by the MD5 digest of the key"
    );

    assert_eq!(cache.get::<Value>("user:1"), Some(json!({"name": "Ann"})));
    assert!(cache.forget("user:1"));
    assert_eq!(cache.get::<Value>("user:1"), None);
    assert_eq!(cache.get_or("user:1", Value::Null), Value::Null);
}

#[test]
fn test_entry_expires_after_ttl() {
    let (cache, _temp_dir) = create_test_cache();
    let path = cache.resolve("short");

    assert!(cache.put("short", "soon gone", 1));
    assert_eq!(cache.get::<String>("short"), Some("soon gone".to_string()));

    // Timestamps have one-second resolution
    thread::sleep(Duration::from_millis(2100));

    assert_eq!(cache.get_or("short", "default".to_string()), "default");
    assert!(!path.exists(), "Expired read should delete the file");
    assert_eq!(cache.lookup("short").unwrap(), Lookup::Missing);
}

#[test]
fn test_pull_then_remember() {
    let (cache, _temp_dir) = create_test_cache();
    cache.put("token", "abc", 0);

    let token: Option<String> = cache.pull("token");
    assert_eq!(token.as_deref(), Some("abc"));
    assert!(!cache.has("token"));

    let regenerated: String = cache.remember("token", 300, || "xyz".to_string());
    assert_eq!(regenerated, "xyz");
    let again: String = cache.remember("token", 300, || unreachable!("should be cached"));
    assert_eq!(again, "xyz");
}

#[test]
fn test_clear_empties_directory() {
    let (cache, temp_dir) = create_test_cache();
    for i in 0..5 {
        cache.put(&format!("key:{}", i), &i, 0);
    }
    fs::write(temp_dir.path().join(".keep"), "").unwrap();

    assert_eq!(cache.clear(), 5);

    let remaining: Vec<_> = fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(remaining, vec![std::ffi::OsString::from(".keep")]);
}

#[test]
fn test_reads_record_written_by_another_producer() {
    let (cache, _temp_dir) = create_test_cache();
    let path = cache.resolve("legacy");
    fs::write(&path, r#"{"created_at":1700000000,"data":"[\"a\",\"b\"]"}"#).unwrap();

    assert_eq!(cache.get::<Vec<String>>("legacy"), Some(vec!["a".into(), "b".into()]));
}

#[test]
fn test_strings_that_look_like_json_stay_strings() {
    let (cache, _temp_dir) = create_test_cache();

    for text in ["[1]", r#"{"a":1}"#] {
        assert!(cache.put("text", text, 0));
        assert_eq!(cache.get::<String>("text").as_deref(), Some(text));

        let remembered: String = cache.remember("text", 0, || unreachable!("should be cached"));
        assert_eq!(remembered, text);

        assert_eq!(cache.pull::<String>("text").as_deref(), Some(text));
        assert!(!cache.has("text"));
    }
}
