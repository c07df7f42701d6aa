//! Read-through caching over a [`DataSource`].

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::{DataSource, Endpoint, FetchError};
use crate::cache::{cache_key, KeyValueCache};

/// A payload and where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fetched {
    pub payload: serde_json::Value,
    pub from_cache: bool,
}

/// A data source fronted by a cache.
///
/// Successful upstream payloads are stored under
/// `cache_key(endpoint, league, season, "")`. Failures are never cached.
#[derive(Clone)]
pub struct CachedSource {
    source: Arc<dyn DataSource>,
    cache: Arc<dyn KeyValueCache>,
}

impl CachedSource {
    pub fn new(source: Arc<dyn DataSource>, cache: Arc<dyn KeyValueCache>) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &Arc<dyn KeyValueCache> {
        &self.cache
    }

    pub fn source(&self) -> &Arc<dyn DataSource> {
        &self.source
    }

    pub fn key_for(endpoint: Endpoint, league: u32, season: u32) -> String {
        cache_key(endpoint.as_str(), league, season, "")
    }

    /// Serve from cache when a live entry exists, otherwise fetch and store.
    pub async fn fetch(
        &self,
        endpoint: Endpoint,
        league: u32,
        season: u32,
    ) -> Result<Fetched, FetchError> {
        let key = Self::key_for(endpoint, league, season);

        if let Some(payload) = self.cache.get(&key) {
            debug!("Serving {} from cache", key);
            return Ok(Fetched {
                payload,
                from_cache: true,
            });
        }

        self.fetch_and_store(endpoint, league, season, &key).await
    }

    /// Drop any cached entry and fetch from the source.
    pub async fn refetch(
        &self,
        endpoint: Endpoint,
        league: u32,
        season: u32,
    ) -> Result<Fetched, FetchError> {
        let key = Self::key_for(endpoint, league, season);
        if let Err(e) = self.cache.remove(&key) {
            warn!("Failed to drop cache entry {}: {}", key, e);
        }
        self.fetch_and_store(endpoint, league, season, &key).await
    }

    /// Fetch every endpoint the analytics need, in `Endpoint::ALL` order.
    pub async fn fetch_all(
        &self,
        league: u32,
        season: u32,
        refresh: bool,
    ) -> Result<Vec<Fetched>, FetchError> {
        let mut fetched = Vec::with_capacity(Endpoint::ALL.len());
        for endpoint in Endpoint::ALL {
            let result = if refresh {
                self.refetch(endpoint, league, season).await?
            } else {
                self.fetch(endpoint, league, season).await?
            };
            fetched.push(result);
        }
        Ok(fetched)
    }

    async fn fetch_and_store(
        &self,
        endpoint: Endpoint,
        league: u32,
        season: u32,
        key: &str,
    ) -> Result<Fetched, FetchError> {
        info!(
            "Fetching {} for league {} season {} from {}",
            endpoint,
            league,
            season,
            self.source.name()
        );
        let payload = self.source.fetch(endpoint, league, season).await?;

        if let Err(e) = self.cache.put(key, &payload) {
            warn!("Failed to cache {}: {}", key, e);
        }

        Ok(Fetched {
            payload,
            from_cache: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and fails on demand.
    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingSource {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DataSource for CountingSource {
        fn name(&self) -> &str {
            "counting"
        }

        async fn fetch(
            &self,
            endpoint: Endpoint,
            league: u32,
            season: u32,
        ) -> Result<serde_json::Value, FetchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(FetchError::Upstream {
                    status: 503,
                    message: "Service Unavailable".to_string(),
                });
            }
            Ok(json!({"get": endpoint.as_str(), "league": league, "season": season, "call": n}))
        }
    }

    #[tokio::test]
    async fn test_read_through() {
        let source = CountingSource::new(false);
        let cache = Arc::new(MemoryCache::default());
        let cached = CachedSource::new(source.clone(), cache.clone());

        let first = cached.fetch(Endpoint::Standings, 135, 2023).await.unwrap();
        assert!(!first.from_cache);
        assert_eq!(first.payload["call"], 1);

        let second = cached.fetch(Endpoint::Standings, 135, 2023).await.unwrap();
        assert!(second.from_cache);
        assert_eq!(second.payload, first.payload);
        assert_eq!(source.calls(), 1);

        // Different season is a different key
        cached.fetch(Endpoint::Standings, 135, 2022).await.unwrap();
        assert_eq!(source.calls(), 2);
        assert!(cache.get("standings_135_2023_").is_some());
        assert!(cache.get("standings_135_2022_").is_some());
    }

    #[tokio::test]
    async fn test_refetch_bypasses_cache() {
        let source = CountingSource::new(false);
        let cached = CachedSource::new(source.clone(), Arc::new(MemoryCache::default()));

        cached.fetch(Endpoint::Teams, 39, 2023).await.unwrap();
        let again = cached.refetch(Endpoint::Teams, 39, 2023).await.unwrap();

        assert!(!again.from_cache);
        assert_eq!(again.payload["call"], 2);

        let served = cached.fetch(Endpoint::Teams, 39, 2023).await.unwrap();
        assert!(served.from_cache);
        assert_eq!(served.payload["call"], 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let source = CountingSource::new(true);
        let cache = Arc::new(MemoryCache::default());
        let cached = CachedSource::new(source.clone(), cache.clone());

        assert!(cached.fetch(Endpoint::Fixtures, 135, 2023).await.is_err());
        assert!(cached.fetch(Endpoint::Fixtures, 135, 2023).await.is_err());

        assert_eq!(source.calls(), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_all() {
        let source = CountingSource::new(false);
        let cached = CachedSource::new(source.clone(), Arc::new(MemoryCache::default()));

        let all = cached.fetch_all(135, 2023, false).await.unwrap();
        let gets: Vec<&str> = all.iter().filter_map(|f| f.payload["get"].as_str()).collect();
        assert_eq!(gets, vec!["standings", "fixtures", "teams"]);

        let again = cached.fetch_all(135, 2023, false).await.unwrap();
        assert!(again.iter().all(|f| f.from_cache));

        let refreshed = cached.fetch_all(135, 2023, true).await.unwrap();
        assert!(refreshed.iter().all(|f| !f.from_cache));
        assert_eq!(source.calls(), 6);
    }
}
