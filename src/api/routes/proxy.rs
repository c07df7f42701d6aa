use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::fetch::Endpoint;

#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    pub endpoint: Option<String>,
    pub league: Option<u32>,
    pub season: Option<u32>,
}

/// Relay one raw upstream payload. League and season default to the
/// configured analytics defaults.
pub async fn proxy(
    State(state): State<AppState>,
    Query(params): Query<ProxyParams>,
) -> Result<Json<Value>, ApiError> {
    let endpoint: Endpoint = params.endpoint.as_deref().unwrap_or_default().parse()?;
    let league = params.league.unwrap_or(state.analytics.league);
    let season = params.season.unwrap_or(state.analytics.season);

    let payload = state.source.source().fetch(endpoint, league, season).await?;
    Ok(Json(payload))
}

/// Empty placeholder data for known endpoints.
pub async fn mock(Path(endpoint): Path<String>) -> Result<Json<Value>, ApiError> {
    endpoint
        .parse::<Endpoint>()
        .map(|_| Json(json!([])))
        .map_err(|_| ApiError::NotFound("Mock endpoint not found".to_string()))
}
