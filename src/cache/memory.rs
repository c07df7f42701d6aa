//! In-process cache.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{CacheEntryInfo, CacheError, CacheItem, KeyValueCache, DEFAULT_CACHE_TTL};

/// Thread-safe in-memory cache.
#[derive(Debug)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheItem>>,
    ttl: Duration,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Store a value as if written at `now`.
    pub fn put_at(&self, key: &str, value: &serde_json::Value, now: DateTime<Utc>) -> Result<(), CacheError> {
        let item = CacheItem::new(key, value.clone(), now, self.ttl);
        self.entries
            .write()
            .map_err(|_| CacheError::Poisoned)?
            .insert(key.to_string(), item);
        Ok(())
    }

    /// Look up a value as of `now`, dropping it if it has expired.
    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<serde_json::Value> {
        let expired = {
            let entries = self.entries.read().ok()?;
            let item = entries.get(key)?;
            if !item.is_expired_at(now) {
                return Some(item.data.clone());
            }
            true
        };

        if expired {
            debug!("Cache entry {} expired", key);
            if let Ok(mut entries) = self.entries.write() {
                entries.remove(key);
            }
        }
        None
    }

    /// Drop entries expired as of `now`.
    pub fn invalidate_expired_at(&self, now: DateTime<Utc>) -> Result<usize, CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Poisoned)?;
        let before = entries.len();
        entries.retain(|_, item| !item.is_expired_at(now));
        Ok(before - entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueCache for MemoryCache {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.get_at(key, Utc::now())
    }

    fn put(&self, key: &str, value: &serde_json::Value) -> Result<(), CacheError> {
        self.put_at(key, value, Utc::now())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.entries
            .write()
            .map_err(|_| CacheError::Poisoned)?
            .remove(key);
        Ok(())
    }

    fn invalidate_expired(&self) -> Result<usize, CacheError> {
        self.invalidate_expired_at(Utc::now())
    }

    fn entries(&self) -> Vec<CacheEntryInfo> {
        let Ok(entries) = self.entries.read() else {
            return Vec::new();
        };
        let mut infos: Vec<CacheEntryInfo> = entries.values().map(CacheItem::info).collect();
        infos.sort_by(|a, b| a.key.cmp(&b.key));
        infos
    }

    fn clear(&self) -> Result<usize, CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Poisoned)?;
        let count = entries.len();
        entries.clear();
        Ok(count)
    }
}
