//! On-disk cache: one JSON file per key.
//!
//! Files are named `{prefix}{hash}.json`, where the hash is the first eight
//! bytes of the SHA-256 of the key. Each file holds a [`CacheItem`], so the
//! original key and the expiry travel with the payload.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::{CacheEntryInfo, CacheError, CacheItem, KeyValueCache, DEFAULT_CACHE_TTL};

/// Default file name prefix.
pub const DEFAULT_FILE_PREFIX: &str = "football_data_";

/// Cache backed by a directory of JSON files.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
    prefix: String,
    ttl: Duration,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: DEFAULT_FILE_PREFIX.to_string(),
            ttl: DEFAULT_CACHE_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_hash(key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..8])
    }

    fn path_for_key(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}.json", self.prefix, Self::key_hash(key)))
    }

    /// Paths of every file this cache owns.
    fn owned_files(&self) -> Vec<PathBuf> {
        let Ok(read_dir) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };

        let mut paths: Vec<PathBuf> = read_dir
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension().and_then(|e| e.to_str()) == Some("json")
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(&self.prefix))
            })
            .collect();
        paths.sort();
        paths
    }

    fn read_item(path: &Path) -> Option<CacheItem> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn remove_file(path: &Path) -> Result<(), CacheError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Store a value as if written at `now`.
    pub fn put_at(&self, key: &str, value: &serde_json::Value, now: DateTime<Utc>) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;
        let item = CacheItem::new(key, value.clone(), now, self.ttl);
        fs::write(self.path_for_key(key), serde_json::to_string(&item)?)?;
        debug!("Cached {}", key);
        Ok(())
    }

    /// Look up a value as of `now`, deleting the file if it has expired.
    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<serde_json::Value> {
        let path = self.path_for_key(key);
        let item = Self::read_item(&path)?;

        // Hash prefixes can collide; the stored key is authoritative
        if item.key != key {
            return None;
        }

        if item.is_expired_at(now) {
            debug!("Cache entry {} expired", key);
            if let Err(e) = Self::remove_file(&path) {
                warn!("Failed to remove expired cache file {}: {}", path.display(), e);
            }
            return None;
        }

        Some(item.data)
    }

    /// Drop entries expired as of `now`, plus any file that does not parse.
    pub fn invalidate_expired_at(&self, now: DateTime<Utc>) -> Result<usize, CacheError> {
        let mut removed = 0;
        for path in self.owned_files() {
            let stale = match Self::read_item(&path) {
                Some(item) => item.is_expired_at(now),
                None => {
                    warn!("Removing unreadable cache file {}", path.display());
                    true
                }
            };
            if stale {
                Self::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

impl KeyValueCache for FileCache {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.get_at(key, Utc::now())
    }

    fn put(&self, key: &str, value: &serde_json::Value) -> Result<(), CacheError> {
        self.put_at(key, value, Utc::now())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        Self::remove_file(&self.path_for_key(key))
    }

    fn invalidate_expired(&self) -> Result<usize, CacheError> {
        self.invalidate_expired_at(Utc::now())
    }

    fn entries(&self) -> Vec<CacheEntryInfo> {
        let mut infos: Vec<CacheEntryInfo> = self
            .owned_files()
            .iter()
            .filter_map(|path| {
                let item = Self::read_item(path)?;
                let size = fs::metadata(path).map(|m| m.len() as usize).ok()?;
                Some(CacheEntryInfo { size, ..item.info() })
            })
            .collect();
        infos.sort_by(|a, b| a.key.cmp(&b.key));
        infos
    }

    fn clear(&self) -> Result<usize, CacheError> {
        let files = self.owned_files();
        for path in &files {
            Self::remove_file(path)?;
        }
        Ok(files.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_key_hash() {
        let a = FileCache::key_hash("standings_135_2023_");
        let b = FileCache::key_hash("fixtures_135_2023_");

        assert_ne!(a, b);
        assert_eq!(a.len(), 16); // 8 bytes = 16 hex chars
    }

    #[test]
    fn test_put_get_roundtrip_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(temp_dir.path().join("cache"));

        cache.put("teams_135_2023_", &json!({"response": [{"team": {"id": 1}}]})).unwrap();

        // A second handle over the same directory sees the entry
        let reopened = FileCache::new(temp_dir.path().join("cache"));
        assert_eq!(
            reopened.get("teams_135_2023_"),
            Some(json!({"response": [{"team": {"id": 1}}]}))
        );
        assert_eq!(reopened.get("teams_39_2023_"), None);
    }

    #[test]
    fn test_expired_get_deletes_file() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(temp_dir.path()).with_ttl(Duration::from_secs(60));
        let now = Utc::now();

        cache.put_at("k", &json!(1), now - chrono::Duration::seconds(61)).unwrap();
        assert_eq!(cache.entries().len(), 1);

        assert_eq!(cache.get_at("k", now), None);
        assert!(cache.entries().is_empty());
    }

    #[test]
    fn test_invalidate_removes_expired_and_unreadable() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(temp_dir.path()).with_ttl(Duration::from_secs(60));
        let now = Utc::now();

        cache.put_at("old", &json!(1), now - chrono::Duration::hours(1)).unwrap();
        cache.put_at("fresh", &json!(2), now).unwrap();
        fs::write(temp_dir.path().join("football_data_garbage.json"), "{not json").unwrap();
        fs::write(temp_dir.path().join("unrelated.json"), "{}").unwrap();

        assert_eq!(cache.invalidate_expired_at(now).unwrap(), 2);
        assert_eq!(cache.get_at("fresh", now), Some(json!(2)));
        assert!(temp_dir.path().join("unrelated.json").exists());
    }

    #[test]
    fn test_entries_remove_and_clear() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(temp_dir.path()).with_prefix("test_");

        cache.put("b", &json!([1, 2, 3])).unwrap();
        cache.put("a", &json!("x")).unwrap();

        let entries = cache.entries();
        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(entries.iter().all(|e| e.size > 0));

        cache.remove("a").unwrap();
        cache.remove("a").unwrap();
        assert_eq!(cache.entries().len(), 1);

        assert_eq!(cache.clear().unwrap(), 1);
        assert!(cache.entries().is_empty());
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(temp_dir.path().join("nope"));

        assert!(cache.entries().is_empty());
        assert_eq!(cache.clear().unwrap(), 0);
        assert_eq!(cache.invalidate_expired().unwrap(), 0);
    }
}
