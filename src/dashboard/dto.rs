use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Date, Duration};

use crate::auth::dto::{Gender, TimeframeUnit};
use crate::auth::repo::ProfilePatch;
use crate::dates::format_date;

#[derive(Debug, Deserialize)]
pub struct MonthlyQuery {
    pub year: Option<i32>,
    pub month: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct WeeklyQuery {
    pub start_date: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MonthDay {
    pub date: String,
    pub in_current_month: bool,
    pub total_calories: f64,
}

#[derive(Debug, Serialize)]
pub struct MonthlyResponse {
    pub year: i32,
    pub month: u8,
    pub days: Vec<MonthDay>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct WeekDay {
    pub date: String,
    pub total_calories: f64,
}

#[derive(Debug, Serialize)]
pub struct WeeklyResponse {
    pub week_start: String,
    pub week_end: String,
    pub days: Vec<WeekDay>,
}

/// One entry per calendar day of the month, zero-filled where nothing was
/// logged.
pub fn fill_month(first: Date, days_in_month: u8, totals: &[(Date, f64)]) -> Vec<MonthDay> {
    (0..days_in_month)
        .map(|offset| {
            let date = first + Duration::days(i64::from(offset));
            let total = totals
                .iter()
                .find(|(d, _)| *d == date)
                .map(|(_, t)| *t)
                .unwrap_or(0.0);
            MonthDay {
                date: format_date(date),
                in_current_month: true,
                total_calories: total,
            }
        })
        .collect()
}

/// Exactly seven entries starting at `start`, zero-filled.
pub fn fill_week(start: Date, totals: &[(Date, f64)]) -> Vec<WeekDay> {
    (0..7)
        .map(|offset| {
            let date = start + Duration::days(offset);
            let total = totals
                .iter()
                .find(|(d, _)| *d == date)
                .map(|(_, t)| *t)
                .unwrap_or(0.0);
            WeekDay {
                date: format_date(date),
                total_calories: total,
            }
        })
        .collect()
}

/// Build a profile patch from a raw JSON body. Only recognized,
/// well-typed fields are applied; anything else is silently ignored.
pub fn patch_from_json(body: &Value) -> ProfilePatch {
    let mut patch = ProfilePatch::default();
    let Some(map) = body.as_object() else {
        return patch;
    };

    let non_blank_str =
        |v: &Value| v.as_str().map(str::trim).filter(|s| !s.is_empty()).map(String::from);

    if let Some(v) = map.get("first_name").and_then(non_blank_str) {
        patch.first_name = Some(v);
    }
    if let Some(v) = map.get("last_name").and_then(non_blank_str) {
        patch.last_name = Some(v);
    }
    if let Some(v) = map.get("phone_number").and_then(Value::as_str) {
        // A blank phone number clears the stored one.
        let trimmed = v.trim();
        patch.phone_number = Some((!trimmed.is_empty()).then(|| trimmed.to_string()));
    }
    if let Some(v) = map.get("age").and_then(Value::as_i64) {
        if v > 0 && v <= i64::from(i32::MAX) {
            patch.age = Some(v as i32);
        }
    }
    if let Some(v) = map.get("gender").and_then(Value::as_str) {
        if let Ok(g) = v.parse::<Gender>() {
            patch.gender = Some(g.as_str().to_string());
        }
    }
    if let Some(v) = map.get("height").and_then(Value::as_f64) {
        if v > 0.0 {
            patch.height_cm = Some(v);
        }
    }
    if let Some(v) = map.get("weight").and_then(Value::as_f64) {
        if v >= 0.0 {
            patch.weight = Some(v);
        }
    }
    if let Some(v) = map.get("goal_weight").and_then(Value::as_f64) {
        if v >= 0.0 {
            patch.goal_weight = Some(v);
        }
    }
    if let Some(v) = map.get("goal_timeframe_value").and_then(Value::as_f64) {
        if v > 0.0 {
            patch.goal_timeframe_value = Some(v);
        }
    }
    if let Some(v) = map.get("goal_timeframe_unit").and_then(Value::as_str) {
        if let Ok(u) = v.parse::<TimeframeUnit>() {
            patch.goal_timeframe_unit = Some(u.as_str().to_string());
        }
    }

    patch
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    #[test]
    fn month_with_no_meals_is_all_zeros() {
        let days = fill_month(date!(2025 - 02 - 01), 28, &[]);
        assert_eq!(days.len(), 28);
        assert!(days.iter().all(|d| d.total_calories == 0.0 && d.in_current_month));
        assert_eq!(days[0].date, "2025-02-01");
        assert_eq!(days[27].date, "2025-02-28");
    }

    #[test]
    fn month_totals_land_on_their_days() {
        let totals = vec![(date!(2025 - 02 - 03), 1800.0), (date!(2025 - 02 - 28), 950.0)];
        let days = fill_month(date!(2025 - 02 - 01), 28, &totals);
        assert_eq!(days[2].total_calories, 1800.0);
        assert_eq!(days[27].total_calories, 950.0);
        assert_eq!(days[1].total_calories, 0.0);
    }

    #[test]
    fn week_always_has_seven_entries() {
        let totals = vec![(date!(2025 - 03 - 12), 2000.0)];
        let days = fill_week(date!(2025 - 03 - 10), &totals);
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].date, "2025-03-10");
        assert_eq!(days[6].date, "2025-03-16");
        assert_eq!(days[2].total_calories, 2000.0);
        assert_eq!(days.iter().filter(|d| d.total_calories == 0.0).count(), 6);
    }

    #[test]
    fn week_crosses_month_boundary() {
        let days = fill_week(date!(2025 - 01 - 29), &[]);
        assert_eq!(days[0].date, "2025-01-29");
        assert_eq!(days[6].date, "2025-02-04");
    }

    #[test]
    fn patch_picks_only_recognized_well_typed_fields() {
        let patch = patch_from_json(&json!({
            "first_name": "Grace",
            "age": 31,
            "weight": 64.5,
            "gender": "FEMALE",
            "goal_timeframe_unit": "week",
            "unknown_field": "ignored",
            "height": "not-a-number",
            "goal_weight": -5.0
        }));
        assert_eq!(patch.first_name.as_deref(), Some("Grace"));
        assert_eq!(patch.age, Some(31));
        assert_eq!(patch.weight, Some(64.5));
        assert_eq!(patch.gender.as_deref(), Some("female"));
        assert_eq!(patch.goal_timeframe_unit.as_deref(), Some("weeks"));
        // Ill-typed and out-of-range values fall away silently.
        assert_eq!(patch.height_cm, None);
        assert_eq!(patch.goal_weight, None);
        assert_eq!(patch.last_name, None);
    }

    #[test]
    fn blank_phone_number_clears_it() {
        let patch = patch_from_json(&json!({ "phone_number": "  " }));
        assert_eq!(patch.phone_number, Some(None));
        let patch = patch_from_json(&json!({ "phone_number": "+4912345" }));
        assert_eq!(patch.phone_number, Some(Some("+4912345".into())));
    }

    #[test]
    fn non_object_body_yields_empty_patch() {
        assert!(patch_from_json(&json!("a string")).is_empty());
        assert!(patch_from_json(&json!([1, 2, 3])).is_empty());
    }
}
