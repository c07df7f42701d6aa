use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::{build_report, AnalyticsReport};

#[derive(Debug, Deserialize)]
pub struct AnalyticsParams {
    pub league: Option<u32>,
    pub season: Option<u32>,
    pub window: Option<usize>,
    pub limit: Option<usize>,
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub league: u32,
    pub season: u32,
    /// True when every payload was served from cache
    pub from_cache: bool,
    #[serde(flatten)]
    pub report: AnalyticsReport,
}

pub async fn analytics(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let league = params.league.unwrap_or(state.analytics.league);
    let season = params.season.unwrap_or(state.analytics.season);
    let options = state.report_options(params.window, params.limit);

    let fetched = state.source.fetch_all(league, season, params.refresh).await?;
    let [standings, fixtures, teams] = fetched.as_slice() else {
        return Err(ApiError::Internal(format!(
            "expected 3 payloads, got {}",
            fetched.len()
        )));
    };

    let report = build_report(&teams.payload, &standings.payload, &fixtures.payload, options);

    Ok(Json(AnalyticsResponse {
        league,
        season,
        from_cache: fetched.iter().all(|f| f.from_cache),
        report,
    }))
}
