use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct DayTotalRow {
    day: Date,
    total: f64,
}

/// Per-day calorie sums for one user inside `[start, end)`. Days without
/// meals produce no row; callers zero-fill. The user id is bound as a
/// `Uuid` so the filter always matches the typed `user_id` column.
pub async fn day_totals(
    db: &PgPool,
    user_id: Uuid,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> anyhow::Result<Vec<(Date, f64)>> {
    let rows = sqlx::query_as::<_, DayTotalRow>(
        r#"
        SELECT (logged_at AT TIME ZONE 'UTC')::date AS day,
               SUM(total_calorie_count)::double precision AS total
        FROM meals
        WHERE user_id = $1 AND logged_at >= $2 AND logged_at < $3
        GROUP BY day
        ORDER BY day
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(|r| (r.day, r.total)).collect())
}
