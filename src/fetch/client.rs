//! Live API-Sports HTTP client.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use super::{DataSource, Endpoint, FetchError};
use crate::storage::JsonlWriter;

/// Configuration for the API client.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// API root, e.g. `https://v3.football.api-sports.io`
    pub base_url: Url,

    /// Value of the `x-rapidapi-host` header
    pub host: String,

    pub api_key: String,

    /// Request timeout
    pub timeout: Duration,

    /// Where to append request traces, if anywhere
    pub trace_log: Option<PathBuf>,
}

impl ApiClientConfig {
    pub fn new(base_url: Url, api_key: &str) -> Self {
        let host = base_url.host_str().unwrap_or_default().to_string();
        Self {
            base_url,
            host,
            api_key: api_key.to_string(),
            timeout: Duration::from_secs(30),
            trace_log: None,
        }
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_trace_log(mut self, path: PathBuf) -> Self {
        self.trace_log = Some(path);
        self
    }
}

/// One upstream request, as written to the trace log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestTrace {
    pub ts: DateTime<Utc>,
    pub method: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
    pub endpoint: Endpoint,
    pub league: u32,
    pub season: u32,
}

/// HTTP client for the football API.
pub struct ApiSportsClient {
    client: Client,
    config: ApiClientConfig,
    trace: Option<JsonlWriter<RequestTrace>>,
}

impl ApiSportsClient {
    /// Create a client. Fails on an empty key or a key that is not a valid header.
    pub fn new(config: ApiClientConfig) -> Result<Self, FetchError> {
        if config.api_key.trim().is_empty() {
            return Err(FetchError::MissingApiKey("key is empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("league-analytics/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(
            "x-rapidapi-key",
            HeaderValue::from_str(&config.api_key)
                .map_err(|_| FetchError::InvalidHeader("x-rapidapi-key"))?,
        );
        headers.insert(
            "x-rapidapi-host",
            HeaderValue::from_str(&config.host)
                .map_err(|_| FetchError::InvalidHeader("x-rapidapi-host"))?,
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        let trace = config.trace_log.clone().map(JsonlWriter::new);

        Ok(Self {
            client,
            config,
            trace,
        })
    }

    /// `{base_url}/{endpoint}?league={league}&season={season}`
    pub fn url_for(&self, endpoint: Endpoint, league: u32, season: u32) -> Result<Url, FetchError> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.config.base_url.to_string()))?
            .pop_if_empty()
            .push(endpoint.as_str());
        url.query_pairs_mut()
            .append_pair("league", &league.to_string())
            .append_pair("season", &season.to_string());
        Ok(url)
    }

    fn record_trace(&self, trace: RequestTrace) {
        let Some(writer) = &self.trace else {
            return;
        };
        if let Err(e) = writer.append(&trace) {
            warn!("Failed to write request trace to {:?}: {}", writer.path(), e);
        }
    }

    async fn send(&self, url: &Url) -> Result<(u16, serde_json::Value), FetchError> {
        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Upstream {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok((status.as_u16(), response.json().await?))
    }
}

#[async_trait]
impl DataSource for ApiSportsClient {
    fn name(&self) -> &str {
        "api-sports"
    }

    async fn fetch(
        &self,
        endpoint: Endpoint,
        league: u32,
        season: u32,
    ) -> Result<serde_json::Value, FetchError> {
        let url = self.url_for(endpoint, league, season)?;
        info!("Fetching {}", url);

        let started = Instant::now();
        let ts = Utc::now();
        let result = self.send(&url).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let (status, error) = match &result {
            Ok((status, _)) => (Some(*status), None),
            Err(FetchError::Upstream { status, .. }) => (Some(*status), None),
            Err(e) => (None, Some(e.to_string())),
        };
        self.record_trace(RequestTrace {
            ts,
            method: "GET".to_string(),
            url: url.to_string(),
            status,
            error,
            duration_ms,
            endpoint,
            league,
            season,
        });

        match result {
            Ok((_, payload)) => {
                debug!("{} answered in {}ms", url, duration_ms);
                Ok(payload)
            }
            Err(e) => {
                warn!("Request to {} failed: {}", url, e);
                Err(e)
            }
        }
    }
}
