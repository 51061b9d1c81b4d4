use serde::{Deserialize, Serialize};

/// Upstream shape of a USDA FoodData Central search response; only the
/// fields the proxy cares about.
#[derive(Debug, Deserialize)]
pub struct UsdaSearchResponse {
    #[serde(default)]
    pub foods: Vec<UsdaFood>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdaFood {
    pub description: Option<String>,
    pub brand_name: Option<String>,
    pub fdc_id: Option<i64>,
    pub serving_size: Option<f64>,
    pub serving_size_unit: Option<String>,
    #[serde(default)]
    pub food_nutrients: Vec<UsdaNutrient>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdaNutrient {
    pub nutrient_id: Option<i64>,
    pub nutrient_number: Option<String>,
    pub nutrient_name: Option<String>,
    pub value: Option<f64>,
    pub unit_name: Option<String>,
}

/// Normalized food record returned to the client.
#[derive(Debug, Serialize)]
pub struct FoodSummary {
    pub description: Option<String>,
    pub brand_name: Option<String>,
    pub fdc_id: Option<i64>,
    pub serving_size: Option<f64>,
    pub serving_size_unit: Option<String>,
    pub calories: f64,
    pub calories_unit: String,
    pub protein: f64,
    pub protein_unit: String,
    pub fat: f64,
    pub fat_unit: String,
    pub carbs: f64,
    pub carbs_unit: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub message: &'static str,
    pub data: Option<Vec<FoodSummary>>,
}

const RESULT_CAP: usize = 10;

fn find_nutrient<'a>(
    nutrients: &'a [UsdaNutrient],
    id: i64,
    number: &str,
    name_matches: impl Fn(&str) -> bool,
) -> Option<&'a UsdaNutrient> {
    nutrients.iter().find(|n| {
        n.nutrient_id == Some(id)
            || n.nutrient_number.as_deref() == Some(number)
            || n.nutrient_name
                .as_deref()
                .map(|name| name_matches(&name.to_lowercase()))
                .unwrap_or(false)
    })
}

fn summarize(food: UsdaFood) -> Option<FoodSummary> {
    let nutrients = &food.food_nutrients;

    // "total" is required for fat and carbs so sub-components like
    // "Fatty acids, total saturated" vs plain fat fractions do not win.
    let energy = find_nutrient(nutrients, 1008, "208", |name| name == "energy");
    let protein = find_nutrient(nutrients, 1003, "203", |name| name.contains("protein"));
    let fat = find_nutrient(nutrients, 1004, "204", |name| {
        name.contains("fat") && name.contains("total")
    });
    let carbs = find_nutrient(nutrients, 1005, "205", |name| {
        name.contains("carbohydrate") && name.contains("total")
    });

    // A record without an energy value is useless for calorie tracking.
    let calories = energy.and_then(|n| n.value)?;

    let value_of = |n: Option<&UsdaNutrient>| n.and_then(|n| n.value).unwrap_or(0.0);
    let unit_of = |n: Option<&UsdaNutrient>, default: &str| {
        n.and_then(|n| n.unit_name.clone())
            .unwrap_or_else(|| default.to_string())
    };

    Some(FoodSummary {
        calories,
        calories_unit: unit_of(energy, "kcal"),
        protein: value_of(protein),
        protein_unit: unit_of(protein, "g"),
        fat: value_of(fat),
        fat_unit: unit_of(fat, "g"),
        carbs: value_of(carbs),
        carbs_unit: unit_of(carbs, "g"),
        description: food.description,
        brand_name: food.brand_name,
        fdc_id: food.fdc_id,
        serving_size: food.serving_size,
        serving_size_unit: food.serving_size_unit,
    })
}

/// Normalize the upstream records: drop anything without an energy value,
/// cap the list, and wrap in the FOUND / NOT_FOUND envelope so the client
/// can tell "no matches" from an empty day.
pub fn normalize(foods: Vec<UsdaFood>) -> SearchResult {
    let summaries: Vec<FoodSummary> = foods
        .into_iter()
        .filter_map(summarize)
        .take(RESULT_CAP)
        .collect();

    if summaries.is_empty() {
        SearchResult {
            message: "NOT_FOUND",
            data: None,
        }
    } else {
        SearchResult {
            message: "FOUND",
            data: Some(summaries),
        }
    }
}
