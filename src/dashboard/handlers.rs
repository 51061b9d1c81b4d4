use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use time::Duration;
use tracing::{info, instrument};

use crate::{
    auth::{dto::UserProfile, extractors::AuthUser, repo::User},
    dashboard::{
        dto::{
            fill_month, fill_week, patch_from_json, MonthlyQuery, MonthlyResponse, WeeklyQuery,
            WeeklyResponse,
        },
        repo,
    },
    dates,
    error::ApiError,
    state::AppState,
};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/profile", get(get_profile).patch(update_profile))
        .route("/dashboard/monthly", get(monthly_stats))
        .route("/dashboard/weekly", get(weekly_stats))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserProfile>, ApiError> {
    let record = User::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(record.into()))
}

#[instrument(skip(state, body, user), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<UserProfile>, ApiError> {
    let patch = patch_from_json(&body);
    if patch.is_empty() {
        // Nothing recognized; return the current profile unchanged.
        return get_profile(State(state), user).await;
    }

    let record = User::update_profile(&state.db, user.id, &patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    info!("profile updated");
    Ok(Json(record.into()))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn monthly_stats(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<MonthlyQuery>,
) -> Result<Json<MonthlyResponse>, ApiError> {
    let (year, month) = match (query.year, query.month) {
        (Some(y), Some(m)) => (y, m),
        _ => {
            return Err(ApiError::Validation(
                "Query parameters `year` and `month` are required".into(),
            ))
        }
    };
    let (start, end, days_in_month) = dates::month_bounds(year, month)
        .ok_or_else(|| ApiError::Validation("Invalid `year` or `month`".into()))?;

    let totals = repo::day_totals(&state.db, user.id, start, end).await?;
    Ok(Json(MonthlyResponse {
        year,
        month,
        days: fill_month(start.date(), days_in_month, &totals),
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn weekly_stats(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<WeeklyQuery>,
) -> Result<Json<WeeklyResponse>, ApiError> {
    let raw = query
        .start_date
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Query parameter `start_date` is required".into()))?;
    let start = dates::parse_date(&raw)
        .ok_or_else(|| ApiError::Validation("Invalid `start_date` query parameter".into()))?;
    let (window_start, window_end) = dates::week_bounds(start)
        .ok_or_else(|| ApiError::Validation("Invalid `start_date` query parameter".into()))?;

    let totals = repo::day_totals(&state.db, user.id, window_start, window_end).await?;

    Ok(Json(WeeklyResponse {
        week_start: dates::format_date(start),
        week_end: dates::format_date(start + Duration::days(6)),
        days: fill_week(start, &totals),
    }))
}
