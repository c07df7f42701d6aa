//! # League Analytics
//!
//! Football league analytics over API-Sports data: team tables, per-game
//! ratios, monthly and matchday trends, moving averages, and top-N rankings.
//!
//! ## Architecture
//!
//! - **models**: Raw upstream records and derived analytics rows
//! - **calculate**: The pure transform pipeline
//! - **fetch**: Upstream data sources (HTTP, static, directory)
//! - **cache**: TTL key-value cache for upstream payloads
//! - **storage**: Data directory layout and JSONL logs
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod cache;
pub mod calculate;
pub mod config;
pub mod fetch;
pub mod models;
pub mod storage;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "12h", "30m", "90s", "1d").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('d') {
        (n, 86400)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.parse().ok()?;
    Some(Duration::from_secs(num.checked_mul(multiplier)?))
}
