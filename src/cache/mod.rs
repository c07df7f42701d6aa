//! Time-boxed key-value cache for upstream payloads.
//!
//! The fetch layer reads through a [`KeyValueCache`]; the analytics pipeline
//! never sees it. Entries expire after a fixed TTL (12 hours by default).

mod file;
mod memory;

pub use file::FileCache;
pub use memory::MemoryCache;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default time-to-live for cached payloads.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cache lock poisoned")]
    Poisoned,
}

/// A stored payload with its write time and expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheItem {
    pub key: String,
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

impl CacheItem {
    pub fn new(key: &str, data: serde_json::Value, now: DateTime<Utc>, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Self {
            key: key.to_string(),
            data,
            timestamp: now,
            expires: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires
    }

    pub fn info(&self) -> CacheEntryInfo {
        CacheEntryInfo {
            key: self.key.clone(),
            timestamp: self.timestamp,
            expires: self.expires,
            size: serde_json::to_string(self).map(|s| s.len()).unwrap_or(0),
        }
    }
}

/// Summary of one cache entry for status displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntryInfo {
    pub key: String,
    pub timestamp: DateTime<Utc>,
    pub expires: DateTime<Utc>,
    /// Serialized size in bytes
    pub size: usize,
}

/// Key-value store with TTL expiry.
pub trait KeyValueCache: Send + Sync {
    /// Fetch a live entry. Expired entries are dropped and reported absent.
    fn get(&self, key: &str) -> Option<serde_json::Value>;

    /// Store a value, replacing any existing entry and restarting its TTL.
    fn put(&self, key: &str, value: &serde_json::Value) -> Result<(), CacheError>;

    /// Remove one entry. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), CacheError>;

    /// Drop every expired (or unreadable) entry, returning how many went.
    fn invalidate_expired(&self) -> Result<usize, CacheError>;

    /// Describe every entry currently stored.
    fn entries(&self) -> Vec<CacheEntryInfo>;

    /// Drop everything, returning how many entries went.
    fn clear(&self) -> Result<usize, CacheError>;
}

/// Build a cache key, e.g. `cache_key("fixtures", 135, 2023, "")`.
pub fn cache_key(endpoint: &str, league: u32, season: u32, chart: &str) -> String {
    format!("{}_{}_{}_{}", endpoint, league, season, chart).to_lowercase()
}
