//! Local data directory layout.
//!
//! Everything the tool writes lives under one data directory:
//! - `cache/` holds cached upstream payloads
//! - `logs/` holds the append-only HTTP trace log
//! - `reports/` holds analytics reports saved from the CLI

mod jsonl;

pub use jsonl::{JsonlReader, JsonlWriter};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.join("cache")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.data_dir.join("reports")
    }

    /// One JSON line per upstream request.
    pub fn trace_log_path(&self) -> PathBuf {
        self.logs_dir().join("http_trace.jsonl")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_paths() {
        let config = StorageConfig::new(PathBuf::from("/data"));

        assert_eq!(config.cache_dir(), PathBuf::from("/data/cache"));
        assert_eq!(config.logs_dir(), PathBuf::from("/data/logs"));
        assert_eq!(config.reports_dir(), PathBuf::from("/data/reports"));
        assert_eq!(
            config.trace_log_path(),
            PathBuf::from("/data/logs/http_trace.jsonl")
        );
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }
}
