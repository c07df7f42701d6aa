//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::calculate::ReportOptions;
use crate::parse_duration;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Environment variable {0} is not set")]
    MissingEnv(String),
}

/// Upstream API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sent as `x-rapidapi-host`
    #[serde(default = "default_api_host")]
    pub host: String,

    /// Name of the environment variable holding the key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "https://v3.football.api-sports.io".to_string()
}

fn default_api_host() -> String {
    "v3.football.api-sports.io".to_string()
}

fn default_api_key_env() -> String {
    "API_SPORTS_KEY".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            host: default_api_host(),
            api_key_env: default_api_key_env(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl ApiConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::MissingEnv(self.api_key_env.clone())),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Payload cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// "file" or "memory"
    #[serde(default = "default_cache_backend")]
    pub backend: String,

    /// Time-to-live, e.g. "12h"
    #[serde(default = "default_cache_ttl")]
    pub ttl: String,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_cache_backend() -> String {
    "file".to_string()
}

fn default_cache_ttl() -> String {
    "12h".to_string()
}

fn default_file_prefix() -> String {
    "football_data_".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_cache_backend(),
            ttl: default_cache_ttl(),
            file_prefix: default_file_prefix(),
        }
    }
}

impl CacheConfig {
    pub fn ttl_duration(&self) -> Option<Duration> {
        parse_duration(&self.ttl)
    }
}

/// Defaults for analytics runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_league")]
    pub league: u32,

    #[serde(default = "default_season")]
    pub season: u32,

    #[serde(default = "default_window_size")]
    pub window_size: usize,

    #[serde(default = "default_top_limit")]
    pub top_limit: usize,
}

fn default_league() -> u32 {
    135
}

fn default_season() -> u32 {
    2023
}

fn default_window_size() -> usize {
    5
}

fn default_top_limit() -> usize {
    10
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            league: default_league(),
            season: default_season(),
            window_size: default_window_size(),
            top_limit: default_top_limit(),
        }
    }
}

impl AnalyticsConfig {
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            window_size: self.window_size,
            top_limit: self.top_limit,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            api: ApiConfig::default(),
            cache: CacheConfig::default(),
            analytics: AnalyticsConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given and present, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if Url::parse(&self.api.base_url).is_err() {
            return Err(ConfigError::ValidationError(format!(
                "API base URL is not a valid URL: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "API timeout must be greater than 0".to_string(),
            ));
        }

        if self.cache.ttl_duration().is_none() {
            return Err(ConfigError::ValidationError(format!(
                "Cache TTL is not a duration: {}",
                self.cache.ttl
            )));
        }

        if !matches!(self.cache.backend.as_str(), "file" | "memory") {
            return Err(ConfigError::ValidationError(format!(
                "Cache backend must be \"file\" or \"memory\", got {}",
                self.cache.backend
            )));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
