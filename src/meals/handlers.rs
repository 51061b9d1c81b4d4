use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};

use crate::{
    auth::extractors::AuthUser,
    dates,
    error::ApiError,
    meals::{
        canonical::{self, CanonicalItem},
        dto::{
            validate_items, ByDateQuery, DayItemResponse, LogMealRequest, LogMealResponse,
            MealResponse, MealsByDateResponse,
        },
        repo,
    },
    state::AppState,
};

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", post(log_meal))
        .route("/meals/by-date", get(meals_by_date))
}

/// Daily replace: logging a day's meals is an idempotent upsert. A
/// resubmission of the canonically equal item set is a no-op; anything
/// else supersedes the day's previous log entirely.
#[instrument(skip(state, payload, user), fields(user_id = %user.id))]
pub async fn log_meal(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<LogMealRequest>,
) -> Result<(StatusCode, Json<LogMealResponse>), ApiError> {
    let incoming = validate_items(payload.items)?;

    let logged_at = match payload.logged_at.as_deref() {
        Some(raw) => dates::parse_logged_at(raw)
            .ok_or_else(|| ApiError::Validation("Invalid `logged_at` date".into()))?,
        None => OffsetDateTime::now_utc(),
    };
    let (start, end) = dates::day_bounds(logged_at.date())
        .ok_or_else(|| ApiError::Validation("Invalid `logged_at` date".into()))?;

    let existing_meals = repo::meals_in_window(&state.db, user.id, start, end).await?;
    let meal_ids: Vec<_> = existing_meals.iter().map(|m| m.id).collect();
    let existing_items = repo::items_for_meals(&state.db, &meal_ids).await?;
    let day_had_log = !existing_meals.is_empty();

    if day_had_log {
        let existing: Vec<CanonicalItem> = existing_items
            .iter()
            .map(|i| CanonicalItem::new(&i.item_name, i.quantity, i.calorie_count))
            .collect();
        if canonical::logs_equal(existing, incoming.clone()) {
            info!("meal log unchanged");
            return Ok((
                StatusCode::OK,
                Json(LogMealResponse {
                    message: "No changes to meal log".into(),
                    meal: None,
                }),
            ));
        }
    }

    let (meal, items) =
        repo::replace_day(&state.db, user.id, start, end, logged_at, &incoming).await?;

    let (status, message) = if day_had_log {
        (StatusCode::OK, "Meal updated successfully")
    } else {
        (StatusCode::CREATED, "Meal logged successfully")
    };
    info!(meal_id = %meal.id, total = meal.total_calorie_count, "meal log written");

    Ok((
        status,
        Json(LogMealResponse {
            message: message.into(),
            meal: Some(MealResponse::from_parts(meal, items)),
        }),
    ))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn meals_by_date(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ByDateQuery>,
) -> Result<Json<MealsByDateResponse>, ApiError> {
    let raw = query
        .date
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Query parameter `date` is required".into()))?;
    let date = dates::parse_date(&raw)
        .ok_or_else(|| ApiError::Validation("Invalid `date` query parameter".into()))?;
    let (start, end) = dates::day_bounds(date)
        .ok_or_else(|| ApiError::Validation("Invalid `date` query parameter".into()))?;

    let meals = repo::meals_in_window(&state.db, user.id, start, end).await?;
    let meal_ids: Vec<_> = meals.iter().map(|m| m.id).collect();
    let items = repo::items_for_meals(&state.db, &meal_ids).await?;

    let total_calories = meals.iter().map(|m| m.total_calorie_count).sum();
    Ok(Json(MealsByDateResponse {
        date: dates::format_date(date),
        items: items.into_iter().map(DayItemResponse::from).collect(),
        total_calories,
    }))
}
