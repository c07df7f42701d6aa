//! Upstream football data sources.
//!
//! Every source yields the raw `{ "response": [...] }` payload for one
//! endpoint of one league season:
//! - [`ApiSportsClient`] talks to the live HTTP API
//! - [`StaticSource`] serves canned payloads from memory
//! - [`DirectorySource`] reads saved payloads from disk
//!
//! [`CachedSource`] layers a [`crate::cache::KeyValueCache`] over any of them.

mod cached;
mod client;

pub use cached::{CachedSource, Fetched};
pub use client::{ApiClientConfig, ApiSportsClient, RequestTrace};

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

/// Errors that can occur during fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Missing API key: {0}")]
    MissingApiKey(String),

    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The upstream collections the analytics need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Standings,
    Fixtures,
    Teams,
}

impl Endpoint {
    pub const ALL: [Endpoint; 3] = [Endpoint::Standings, Endpoint::Fixtures, Endpoint::Teams];

    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Standings => "standings",
            Endpoint::Fixtures => "fixtures",
            Endpoint::Teams => "teams",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Endpoint {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standings" => Ok(Endpoint::Standings),
            "fixtures" => Ok(Endpoint::Fixtures),
            "teams" => Ok(Endpoint::Teams),
            other => Err(FetchError::InvalidEndpoint(other.to_string())),
        }
    }
}

/// An envelope with no records.
pub fn empty_payload() -> serde_json::Value {
    serde_json::json!({ "response": [] })
}

/// A provider of raw upstream payloads.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Source identifier for logging.
    fn name(&self) -> &str;

    /// Fetch one endpoint for one league season.
    async fn fetch(
        &self,
        endpoint: Endpoint,
        league: u32,
        season: u32,
    ) -> Result<serde_json::Value, FetchError>;
}

/// Canned payloads held in memory. League and season are ignored.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    payloads: HashMap<Endpoint, serde_json::Value>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(mut self, endpoint: Endpoint, payload: serde_json::Value) -> Self {
        self.payloads.insert(endpoint, payload);
        self
    }
}

#[async_trait]
impl DataSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(
        &self,
        endpoint: Endpoint,
        _league: u32,
        _season: u32,
    ) -> Result<serde_json::Value, FetchError> {
        Ok(self
            .payloads
            .get(&endpoint)
            .cloned()
            .unwrap_or_else(empty_payload))
    }
}

/// Payloads saved as `{dir}/{endpoint}.json`. League and season are ignored.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, endpoint: Endpoint) -> PathBuf {
        self.dir.join(format!("{}.json", endpoint))
    }
}

#[async_trait]
impl DataSource for DirectorySource {
    fn name(&self) -> &str {
        "directory"
    }

    async fn fetch(
        &self,
        endpoint: Endpoint,
        _league: u32,
        _season: u32,
    ) -> Result<serde_json::Value, FetchError> {
        let path = self.path_for(endpoint);
        if !path.exists() {
            warn!("No saved payload at {}, using an empty one", path.display());
            return Ok(empty_payload());
        }

        debug!("Reading {}", path.display());
        let content = fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&content)?)
    }
}
