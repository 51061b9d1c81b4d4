use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::meals::canonical::{total_calories, CanonicalItem};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Meal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_calorie_count: f64,
    pub logged_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MealItem {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub item_name: String,
    pub quantity: f64,
    pub calorie_count: f64,
    pub created_at: OffsetDateTime,
}

/// Meals a user logged inside `[start, end)`.
pub async fn meals_in_window(
    db: &PgPool,
    user_id: Uuid,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> anyhow::Result<Vec<Meal>> {
    let meals = sqlx::query_as::<_, Meal>(
        r#"
        SELECT id, user_id, total_calorie_count, logged_at, created_at
        FROM meals
        WHERE user_id = $1 AND logged_at >= $2 AND logged_at < $3
        ORDER BY logged_at ASC
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await?;
    Ok(meals)
}

pub async fn items_for_meals(db: &PgPool, meal_ids: &[Uuid]) -> anyhow::Result<Vec<MealItem>> {
    if meal_ids.is_empty() {
        return Ok(Vec::new());
    }
    let items = sqlx::query_as::<_, MealItem>(
        r#"
        SELECT id, meal_id, item_name, quantity, calorie_count, created_at
        FROM meal_items
        WHERE meal_id = ANY($1)
        ORDER BY created_at ASC
        "#,
    )
    .bind(meal_ids)
    .fetch_all(db)
    .await?;
    Ok(items)
}

/// Replace the user's meal log for one day: delete whatever the window
/// holds, then insert a fresh meal with its items. Runs in a single
/// transaction so a failure mid-way never leaves the day half-written,
/// and the persisted total is always the sum of the items written with
/// it.
pub async fn replace_day(
    db: &PgPool,
    user_id: Uuid,
    start: OffsetDateTime,
    end: OffsetDateTime,
    logged_at: OffsetDateTime,
    items: &[CanonicalItem],
) -> anyhow::Result<(Meal, Vec<MealItem>)> {
    let mut tx = db.begin().await?;

    // Items go with their meals via ON DELETE CASCADE.
    sqlx::query("DELETE FROM meals WHERE user_id = $1 AND logged_at >= $2 AND logged_at < $3")
        .bind(user_id)
        .bind(start)
        .bind(end)
        .execute(&mut *tx)
        .await?;

    let meal = sqlx::query_as::<_, Meal>(
        r#"
        INSERT INTO meals (user_id, total_calorie_count, logged_at)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, total_calorie_count, logged_at, created_at
        "#,
    )
    .bind(user_id)
    .bind(total_calories(items))
    .bind(logged_at)
    .fetch_one(&mut *tx)
    .await?;

    let mut created = Vec::with_capacity(items.len());
    for item in items {
        let row = sqlx::query_as::<_, MealItem>(
            r#"
            INSERT INTO meal_items (meal_id, item_name, quantity, calorie_count)
            VALUES ($1, $2, $3, $4)
            RETURNING id, meal_id, item_name, quantity, calorie_count, created_at
            "#,
        )
        .bind(meal.id)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(item.calorie_count)
        .fetch_one(&mut *tx)
        .await?;
        created.push(row);
    }

    tx.commit().await?;
    Ok((meal, created))
}
