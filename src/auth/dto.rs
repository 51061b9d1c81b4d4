use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::User;
use crate::error::ApiError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
            Gender::PreferNotToSay => "prefer_not_to_say",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            "prefer_not_to_say" => Ok(Gender::PreferNotToSay),
            other => Err(format!("unknown gender: {other}")),
        }
    }
}

/// Goal timeframe unit, normalized at the boundary: singular or plural,
/// any casing, always stored in the canonical plural form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeframeUnit {
    Days,
    Weeks,
    Months,
}

impl TimeframeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeframeUnit::Days => "days",
            TimeframeUnit::Weeks => "weeks",
            TimeframeUnit::Months => "months",
        }
    }
}

impl FromStr for TimeframeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" | "days" => Ok(TimeframeUnit::Days),
            "week" | "weeks" => Ok(TimeframeUnit::Weeks),
            "month" | "months" => Ok(TimeframeUnit::Months),
            other => Err(format!("unknown timeframe unit: {other}")),
        }
    }
}

/// Request body for user registration. Fields are optional at the serde
/// layer so a missing field yields a 400 with a stable message instead of
/// a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone_number: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub goal_weight: Option<f64>,
    pub goal_timeframe_value: Option<f64>,
    pub goal_timeframe_unit: Option<String>,
}

/// Validated registration data, ready to persist.
#[derive(Debug)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
    pub age: i32,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight: f64,
    pub goal_weight: f64,
    pub goal_timeframe_value: f64,
    pub goal_timeframe_unit: TimeframeUnit,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<NewUser, ApiError> {
        let missing = || ApiError::Validation("Missing required fields".into());

        let first_name = self.first_name.filter(|s| !s.trim().is_empty()).ok_or_else(missing)?;
        let last_name = self.last_name.filter(|s| !s.trim().is_empty()).ok_or_else(missing)?;
        let email = self
            .email
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .ok_or_else(missing)?;
        let password = self.password.filter(|s| !s.is_empty()).ok_or_else(missing)?;
        let age = self.age.ok_or_else(missing)?;
        let gender = self.gender.ok_or_else(missing)?;
        let height_cm = self.height.ok_or_else(missing)?;
        let weight = self.weight.ok_or_else(missing)?;
        let goal_weight = self.goal_weight.ok_or_else(missing)?;
        let goal_timeframe_value = self.goal_timeframe_value.ok_or_else(missing)?;
        let goal_timeframe_unit = self.goal_timeframe_unit.ok_or_else(missing)?;

        if !is_valid_email(&email) {
            return Err(ApiError::Validation("Invalid email".into()));
        }
        if password.len() < 8 {
            return Err(ApiError::Validation("Password too short".into()));
        }
        if age <= 0 {
            return Err(ApiError::Validation("Age must be greater than zero".into()));
        }
        let gender = gender
            .parse::<Gender>()
            .map_err(|_| ApiError::Validation("Invalid gender".into()))?;
        let goal_timeframe_unit = goal_timeframe_unit
            .parse::<TimeframeUnit>()
            .map_err(|_| ApiError::Validation("Invalid goal timeframe unit".into()))?;

        // Blank phone number means "not provided".
        let phone_number = self
            .phone_number
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        Ok(NewUser {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            email,
            password,
            phone_number,
            age,
            gender,
            height_cm,
            weight,
            goal_weight,
            goal_timeframe_value,
            goal_timeframe_unit,
        })
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public part of the user returned to the client; never carries
/// `password_hash` or `refresh_token`.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
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
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            phone_number: u.phone_number,
            age: u.age,
            gender: u.gender,
            height_cm: u.height_cm,
            weight: u.weight,
            goal_weight: u.goal_weight,
            goal_timeframe_value: u.goal_timeframe_value,
            goal_timeframe_unit: u.goal_timeframe_unit,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Response returned after register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> RegisterRequest {
        RegisterRequest {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            email: Some("Ada@Example.COM".into()),
            password: Some("longenough".into()),
            phone_number: Some("  ".into()),
            age: Some(30),
            gender: Some("Female".into()),
            height: Some(168.0),
            weight: Some(62.0),
            goal_weight: Some(60.0),
            goal_timeframe_value: Some(6.0),
            goal_timeframe_unit: Some("Weeks".into()),
        }
    }

    #[test]
    fn validates_and_normalizes_full_payload() {
        let user = full_request().validate().expect("valid payload");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.gender, Gender::Female);
        assert_eq!(user.goal_timeframe_unit, TimeframeUnit::Weeks);
        // Blank phone number is treated as absent.
        assert_eq!(user.phone_number, None);
    }

    #[test]
    fn each_required_field_is_enforced() {
        let blankers: Vec<fn(&mut RegisterRequest)> = vec![
            |r| r.first_name = None,
            |r| r.last_name = None,
            |r| r.email = None,
            |r| r.password = None,
            |r| r.age = None,
            |r| r.gender = None,
            |r| r.height = None,
            |r| r.weight = None,
            |r| r.goal_weight = None,
            |r| r.goal_timeframe_value = None,
            |r| r.goal_timeframe_unit = None,
        ];
        for blank in blankers {
            let mut req = full_request();
            blank(&mut req);
            let err = req.validate().unwrap_err();
            assert_eq!(err.to_string(), "Missing required fields");
        }
    }

    #[test]
    fn rejects_bad_email_and_short_password() {
        let mut req = full_request();
        req.email = Some("not-an-email".into());
        assert!(req.validate().is_err());

        let mut req = full_request();
        req.password = Some("short".into());
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_nonpositive_age() {
        let mut req = full_request();
        req.age = Some(0);
        assert!(req.validate().is_err());
    }

    #[test]
    fn timeframe_unit_accepts_singular_and_plural() {
        for (input, expected) in [
            ("day", TimeframeUnit::Days),
            ("DAYS", TimeframeUnit::Days),
            ("Week", TimeframeUnit::Weeks),
            ("weeks", TimeframeUnit::Weeks),
            ("month", TimeframeUnit::Months),
            ("Months", TimeframeUnit::Months),
        ] {
            assert_eq!(input.parse::<TimeframeUnit>().unwrap(), expected);
        }
        assert!("fortnight".parse::<TimeframeUnit>().is_err());
    }

    #[test]
    fn gender_parses_known_values_only() {
        assert_eq!("MALE".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!(
            "prefer_not_to_say".parse::<Gender>().unwrap(),
            Gender::PreferNotToSay
        );
        assert!("unknown".parse::<Gender>().is_err());
    }
}
