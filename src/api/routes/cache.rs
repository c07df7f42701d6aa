use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::cache::CacheEntryInfo;

#[derive(Debug, Serialize)]
pub struct CacheStatusResponse {
    pub count: usize,
    pub entries: Vec<CacheEntryInfo>,
}

#[derive(Debug, Serialize)]
pub struct CacheClearedResponse {
    pub cleared: usize,
}

pub async fn list_entries(State(state): State<AppState>) -> Json<CacheStatusResponse> {
    let entries = state.source.cache().entries();
    Json(CacheStatusResponse {
        count: entries.len(),
        entries,
    })
}

pub async fn clear(State(state): State<AppState>) -> Result<Json<CacheClearedResponse>, ApiError> {
    let cleared = state
        .source
        .cache()
        .clear()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    tracing::info!("Cleared {} cache entries", cleared);
    Ok(Json(CacheClearedResponse { cleared }))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{get_json, send, state_with};
    use crate::api::build_router;
    use crate::cache::KeyValueCache;
    use crate::fetch::StaticSource;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_list_and_clear() {
        let (state, cache) = state_with(Arc::new(StaticSource::new()));
        cache.put("teams_135_2023_", &json!({"response": []})).unwrap();
        cache.put("fixtures_135_2023_", &json!({"response": []})).unwrap();
        let app = build_router(state);

        let (status, json) = get_json(app.clone(), "/api/cache").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 2);
        assert_eq!(json["entries"][0]["key"], "fixtures_135_2023_");
        assert!(json["entries"][0]["size"].as_u64().unwrap() > 0);

        let (status, json) = send(app.clone(), "DELETE", "/api/cache").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["cleared"], 2);

        let (_, json) = get_json(app, "/api/cache").await;
        assert_eq!(json["count"], 0);
    }
}
