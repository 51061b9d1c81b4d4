use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::{
    auth::extractors::AuthUser,
    error::ApiError,
    nutrition::dto::{normalize, SearchResult, UsdaSearchResponse},
    state::AppState,
};

const USDA_SEARCH_URL: &str = "https://api.nal.usda.gov/fdc/v1/foods/search";
const UPSTREAM_PAGE_SIZE: u32 = 5;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

pub fn nutrition_routes() -> Router<AppState> {
    Router::new().route("/meals/usda_search", get(usda_search))
}

/// Thin proxy to USDA FoodData Central. Upstream failures surface as a
/// 502 with a generic message; upstream internals are never forwarded.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn usda_search(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResult>, ApiError> {
    let term = query
        .query
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::Validation("Query parameter `query` is required".into()))?;

    let api_key = state.config.usda_api_key.clone().ok_or_else(|| {
        ApiError::Config("USDA API key is not configured on the server".into())
    })?;

    let upstream_failed = |e: &dyn std::fmt::Display| {
        warn!(error = %e, "usda upstream call failed");
        ApiError::Upstream("Failed to fetch nutrition data from USDA FoodData".into())
    };

    let page_size = UPSTREAM_PAGE_SIZE.to_string();
    let response = state
        .http
        .get(USDA_SEARCH_URL)
        .query(&[
            ("query", term.as_str()),
            ("api_key", api_key.as_str()),
            ("pageSize", page_size.as_str()),
        ])
        .send()
        .await
        .map_err(|e| upstream_failed(&e))?
        .error_for_status()
        .map_err(|e| upstream_failed(&e))?;

    let body: UsdaSearchResponse = response.json().await.map_err(|e| upstream_failed(&e))?;

    Ok(Json(normalize(body.foods)))
}
