use std::cmp::Ordering;

/// Item reduced to the fields that define a day's log, with the name
/// trimmed. Two logs that canonicalize to the same sequence are the same
/// log, regardless of submission order.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalItem {
    pub name: String,
    pub quantity: f64,
    pub calorie_count: f64,
}

impl CanonicalItem {
    pub fn new(name: &str, quantity: f64, calorie_count: f64) -> Self {
        Self {
            name: name.trim().to_string(),
            quantity,
            calorie_count,
        }
    }
}

/// Total order over `(name, quantity, calorie_count)`; `total_cmp` keeps
/// the float fields totally ordered.
fn cmp_items(a: &CanonicalItem, b: &CanonicalItem) -> Ordering {
    a.name
        .cmp(&b.name)
        .then_with(|| a.quantity.total_cmp(&b.quantity))
        .then_with(|| a.calorie_count.total_cmp(&b.calorie_count))
}

pub fn canonicalize(mut items: Vec<CanonicalItem>) -> Vec<CanonicalItem> {
    items.sort_by(cmp_items);
    items
}

/// Value equality of two item sets after canonicalization; drives the
/// no-op path of the daily replace.
pub fn logs_equal(a: Vec<CanonicalItem>, b: Vec<CanonicalItem>) -> bool {
    canonicalize(a) == canonicalize(b)
}

pub fn total_calories(items: &[CanonicalItem]) -> f64 {
    items.iter().map(|i| i.calorie_count).sum()
}
