use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;
use crate::meals::canonical::CanonicalItem;
use crate::meals::repo::{Meal, MealItem};

/// Body of `POST /meals`. `logged_at` backdates the log to a specific
/// calendar day; absent means today.
#[derive(Debug, Deserialize)]
pub struct LogMealRequest {
    pub items: Option<Vec<MealItemInput>>,
    pub logged_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MealItemInput {
    pub item_name: Option<String>,
    pub quantity: Option<f64>,
    pub calorie_count: Option<f64>,
}

/// Validate and canonicalize the submitted items.
pub fn validate_items(items: Option<Vec<MealItemInput>>) -> Result<Vec<CanonicalItem>, ApiError> {
    let items = items.filter(|i| !i.is_empty()).ok_or_else(|| {
        ApiError::Validation("Request body must include a non-empty `items` array".into())
    })?;

    let invalid = || {
        ApiError::Validation(
            "Each item must include `item_name` (string), `quantity` (number > 0), \
             and `calorie_count` (number >= 0)"
                .into(),
        )
    };

    items
        .into_iter()
        .map(|item| {
            let name = item.item_name.ok_or_else(invalid)?;
            let quantity = item.quantity.ok_or_else(invalid)?;
            let calorie_count = item.calorie_count.ok_or_else(invalid)?;
            if name.trim().is_empty() || quantity <= 0.0 || calorie_count < 0.0 {
                return Err(invalid());
            }
            Ok(CanonicalItem::new(&name, quantity, calorie_count))
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct MealItemResponse {
    pub id: Uuid,
    pub item_name: String,
    pub quantity: f64,
    pub calorie_count: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct MealResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<MealItemResponse>,
    pub total_calorie_count: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl MealResponse {
    pub fn from_parts(meal: Meal, items: Vec<MealItem>) -> Self {
        Self {
            id: meal.id,
            user_id: meal.user_id,
            items: items
                .into_iter()
                .map(|i| MealItemResponse {
                    id: i.id,
                    item_name: i.item_name,
                    quantity: i.quantity,
                    calorie_count: i.calorie_count,
                    created_at: i.created_at,
                })
                .collect(),
            total_calorie_count: meal.total_calorie_count,
            logged_at: meal.logged_at,
            created_at: meal.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LogMealResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal: Option<MealResponse>,
}

#[derive(Debug, Deserialize)]
pub struct ByDateQuery {
    pub date: Option<String>,
}

/// One logged item flattened for the by-date view. `base_calories` is the
/// per-unit calorie count so the client can recompute while editing
/// quantities.
#[derive(Debug, Serialize)]
pub struct DayItemResponse {
    pub id: Uuid,
    pub item_name: String,
    pub quantity: f64,
    pub calorie_count: f64,
    pub base_calories: f64,
}

impl From<MealItem> for DayItemResponse {
    fn from(i: MealItem) -> Self {
        Self {
            id: i.id,
            item_name: i.item_name,
            quantity: i.quantity,
            // quantity is constrained > 0 at write time
            base_calories: i.calorie_count / i.quantity,
            calorie_count: i.calorie_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MealsByDateResponse {
    pub date: String,
    pub items: Vec<DayItemResponse>,
    pub total_calories: f64,
}
