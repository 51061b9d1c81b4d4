use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::dto::NewUser;

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, phone_number, age, \
     gender, height_cm, weight, goal_weight, goal_timeframe_value, goal_timeframe_unit, \
     refresh_token, created_at, updated_at";

/// User record in the database. Secrets are never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub age: i32,
    pub gender: String,
    pub height_cm: f64,
    pub weight: f64,
    pub goal_weight: f64,
    pub goal_timeframe_value: f64,
    pub goal_timeframe_unit: String,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Partial profile update; `None` leaves a column untouched. The phone
/// number carries an extra level so a blank submission can clear it.
#[derive(Debug, Default)]
pub struct ProfilePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<Option<String>>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height_cm: Option<f64>,
    pub weight: Option<f64>,
    pub goal_weight: Option<f64>,
    pub goal_timeframe_value: Option<f64>,
    pub goal_timeframe_unit: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone_number.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.height_cm.is_none()
            && self.weight.is_none()
            && self.goal_weight.is_none()
            && self.goal_timeframe_value.is_none()
            && self.goal_timeframe_unit.is_none()
    }
}

impl User {
    /// Find a user by (already lowercased) email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user from a validated registration.
    pub async fn create(db: &PgPool, new: &NewUser, password_hash: &str) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, phone_number,
                               age, gender, height_cm, weight, goal_weight,
                               goal_timeframe_value, goal_timeframe_unit)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.email)
        .bind(password_hash)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.phone_number)
        .bind(new.age)
        .bind(new.gender.as_str())
        .bind(new.height_cm)
        .bind(new.weight)
        .bind(new.goal_weight)
        .bind(new.goal_timeframe_value)
        .bind(new.goal_timeframe_unit.as_str())
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Overwrite the stored refresh token; at most one is valid per user.
    pub async fn set_refresh_token(db: &PgPool, id: Uuid, token: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET refresh_token = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn clear_refresh_token(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET refresh_token = NULL, updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Apply a partial profile update and return the fresh row.
    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        patch: &ProfilePatch,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                phone_number = CASE WHEN $4 THEN $5 ELSE phone_number END,
                age = COALESCE($6, age),
                gender = COALESCE($7, gender),
                height_cm = COALESCE($8, height_cm),
                weight = COALESCE($9, weight),
                goal_weight = COALESCE($10, goal_weight),
                goal_timeframe_value = COALESCE($11, goal_timeframe_value),
                goal_timeframe_unit = COALESCE($12, goal_timeframe_unit),
                updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&patch.first_name)
        .bind(&patch.last_name)
        .bind(patch.phone_number.is_some())
        .bind(patch.phone_number.clone().flatten())
        .bind(patch.age)
        .bind(&patch.gender)
        .bind(patch.height_cm)
        .bind(patch.weight)
        .bind(patch.goal_weight)
        .bind(patch.goal_timeframe_value)
        .bind(&patch.goal_timeframe_unit)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}
