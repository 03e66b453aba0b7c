//! Candidate filters, applied in order before scoring.
//!
//! Ingredient checks are plain lowercase substring matches against
//! `ingredients_text`. That keeps known false positives (`butter` inside
//! `buttermilk` for dairy-free); callers rely on that behavior staying put.

use cyclewell_core::{CatalogItem, CategoryFilter, HistoryEntry, Preferences, UserContext, ANY};
use time::{Duration, OffsetDateTime};

use crate::config::ScoringWeights;

const MEAT_AND_FISH: &[&str] = &[
    "meat", "chicken", "beef", "pork", "fish", "salmon", "tuna", "bacon", "ham", "turkey",
    "lamb", "shrimp", "anchov", "gelatin",
];
const ANIMAL_PRODUCTS: &[&str] = &[
    "milk", "cheese", "butter", "cream", "yogurt", "yoghurt", "egg", "honey", "whey",
];
const GLUTEN: &[&str] = &[
    "wheat", "flour", "bread", "pasta", "barley", "rye", "couscous", "seitan", "semolina",
    "spelt",
];
const DAIRY: &[&str] = &[
    "milk", "cheese", "butter", "cream", "yogurt", "yoghurt", "whey", "casein", "ghee",
];

/// Meal slot derived from the hour of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Snack,
    Dinner,
}

impl MealSlot {
    #[must_use]
    pub const fn from_hour(hour: u8) -> Self {
        match hour {
            0..=9 => Self::Breakfast,
            10..=13 => Self::Lunch,
            14..=16 => Self::Snack,
            _ => Self::Dinner,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Snack => "snack",
            Self::Dinner => "dinner",
        }
    }
}

/// Returns the category to filter on, or `None` when every category is allowed.
#[must_use]
pub fn resolve_category(filter: &CategoryFilter, hour: u8) -> Option<String> {
    match filter {
        CategoryFilter::Auto => Some(MealSlot::from_hour(hour).as_str().to_string()),
        CategoryFilter::Any => None,
        CategoryFilter::Exact(category) if category.eq_ignore_ascii_case(ANY) => None,
        CategoryFilter::Exact(category) => Some(category.clone()),
    }
}

/// Effective prep-time ceiling: the stricter of context and preferences.
#[must_use]
pub fn prep_time_limit(context: &UserContext, weights: &ScoringWeights) -> u32 {
    let fallback = weights.default_max_prep_time;
    context
        .max_prep_time
        .unwrap_or(fallback)
        .min(context.preferences.max_prep_time.unwrap_or(fallback))
}

#[must_use]
pub fn complexity_ceiling(preferences: &Preferences, weights: &ScoringWeights) -> u8 {
    preferences
        .preferred_complexity
        .map_or(weights.default_complexity_ceiling, |d| d.ordinal())
}

/// Category, time and complexity check.
#[must_use]
pub fn passes_basic(item: &CatalogItem, category: Option<&str>, max_minutes: u32, ceiling: u8) -> bool {
    if let Some(category) = category {
        if !item.category.eq_ignore_ascii_case(category) {
            return false;
        }
    }
    item.prep_time_minutes <= max_minutes && item.difficulty.ordinal() <= ceiling
}

/// Drops items consumed within the last `days` days. Entries dated after
/// `now` count as recent. `days == 0` disables the exclusion.
#[must_use]
pub fn exclude_recent<'a>(
    items: Vec<&'a CatalogItem>,
    history: &[HistoryEntry],
    now: OffsetDateTime,
    days: i64,
) -> Vec<&'a CatalogItem> {
    if days <= 0 || history.is_empty() {
        return items;
    }
    // A window reaching past the representable range covers the whole history.
    let cutoff = days
        .checked_mul(86_400)
        .and_then(|secs| now.checked_sub(Duration::seconds(secs)));
    let is_recent = |entry: &HistoryEntry| cutoff.map_or(true, |cutoff| entry.consumed_at > cutoff);
    items
        .into_iter()
        .filter(|item| {
            !history
                .iter()
                .any(|entry| entry.item_id == item.id && is_recent(entry))
        })
        .collect()
}

/// `gluten_free`, `Gluten Free` and `gluten-free` name the same restriction.
fn normalize_restriction(restriction: &str) -> String {
    restriction
        .trim()
        .to_lowercase()
        .replace(['_', ' '], "-")
}

fn conflict_keywords(restriction: &str) -> Vec<&'static str> {
    match restriction {
        "vegetarian" => MEAT_AND_FISH.to_vec(),
        "vegan" => MEAT_AND_FISH.iter().chain(ANIMAL_PRODUCTS).copied().collect(),
        "gluten-free" => GLUTEN.to_vec(),
        "dairy-free" => DAIRY.to_vec(),
        _ => Vec::new(),
    }
}

/// An item satisfies a restriction when it says so, or when nothing in its
/// ingredient text conflicts with it. Unknown restrictions have no conflicts.
#[must_use]
pub fn satisfies_restriction(item: &CatalogItem, restriction: &str) -> bool {
    let restriction = normalize_restriction(restriction);
    if restriction.is_empty() {
        return true;
    }
    let declared = item
        .dietary_restrictions_satisfied
        .iter()
        .any(|r| normalize_restriction(r) == restriction);
    if declared {
        return true;
    }
    let ingredients = item.ingredients_text.to_lowercase();
    !conflict_keywords(&restriction)
        .iter()
        .any(|keyword| ingredients.contains(keyword))
}

/// Lowercased, non-blank union of allergies and disliked ingredients.
fn excluded_ingredients(preferences: &Preferences) -> Vec<String> {
    preferences
        .allergies
        .iter()
        .chain(&preferences.disliked_ingredients)
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[must_use]
pub fn filter_dietary<'a>(items: Vec<&'a CatalogItem>, preferences: &Preferences) -> Vec<&'a CatalogItem> {
    let excluded = excluded_ingredients(preferences);
    items
        .into_iter()
        .filter(|item| {
            preferences
                .dietary_restrictions
                .iter()
                .all(|restriction| satisfies_restriction(item, restriction))
        })
        .filter(|item| {
            let ingredients = item.ingredients_text.to_lowercase();
            !excluded.iter().any(|needle| ingredients.contains(needle.as_str()))
        })
        .collect()
}
