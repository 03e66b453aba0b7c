#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Core types and collaborator traits for cyclewell.
//!
//! Everything in here is transient per request: the catalog snapshot, the
//! user context and the ranked output. Loading and persisting them is left to
//! implementations of [`CatalogProvider`], [`PreferenceProvider`] and
//! [`HistoryRecorder`].

pub mod event;
pub mod store;

use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

pub use event::ConsumptionEvent;
pub use store::{InMemoryStore, StoreError};

/// Sentinel used in `cycle_phases` and as a category filter.
pub const ANY: &str = "any";

/// Ordered difficulty of a meal or activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    #[serde(alias = "very_easy")]
    VeryEasy,
    #[default]
    Easy,
    Medium,
    #[serde(alias = "hard")]
    Advanced,
}

impl Difficulty {
    /// Ordinal used for complexity ceilings (`very-easy` = 1).
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::VeryEasy => 1,
            Self::Easy => 2,
            Self::Medium => 3,
            Self::Advanced => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlycemicIndex {
    Low,
    Medium,
    High,
}

/// One candidate meal or activity. Read-only for the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub category: String,
    /// Preparation time for meals, duration for activities.
    #[serde(default, alias = "duration_minutes", alias = "prepTimeMinutes", alias = "durationMinutes")]
    pub prep_time_minutes: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub symptom_targets: Vec<String>,
    #[serde(default)]
    pub cycle_phases: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions_satisfied: Vec<String>,
    #[serde(default)]
    pub ingredients_text: String,
    #[serde(default)]
    pub season: Vec<String>,
    #[serde(default)]
    pub main_nutrients: Vec<String>,
    #[serde(default)]
    pub mood_boosting: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glycemic_index_category: Option<GlycemicIndex>,
}

/// Dietary and convenience preferences stored per user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub disliked_ingredients: Vec<String>,
    #[serde(default)]
    pub max_prep_time: Option<u32>,
    #[serde(default)]
    pub preferred_complexity: Option<Difficulty>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub item_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub consumed_at: OffsetDateTime,
}

/// Which category the caller asks for.
///
/// On the wire this is a plain string: `"auto"` lets the engine pick a meal
/// slot from the hour of day, `"any"` disables category filtering.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    Auto,
    Any,
    Exact(String),
}

impl From<String> for CategoryFilter {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Self::Auto,
            ANY => Self::Any,
            _ => Self::Exact(value.trim().to_string()),
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<CategoryFilter> for String {
    fn from(value: CategoryFilter) -> Self {
        value.to_string()
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Any => f.write_str(ANY),
            Self::Exact(category) => f.write_str(category),
        }
    }
}

/// Per-request context built by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub cycle_phase: Option<String>,
    /// Hour of day, 0–23.
    #[serde(default, alias = "time_of_day")]
    pub hour: u8,
    #[serde(default, alias = "meal_type")]
    pub category: CategoryFilter,
    #[serde(default)]
    pub max_prep_time: Option<u32>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub recent_history: Vec<HistoryEntry>,
}

/// Everything one ranking call needs, including the injected clock.
#[derive(Debug, Clone)]
pub struct SuggestionRequest {
    pub catalog: Vec<CatalogItem>,
    pub context: UserContext,
    pub now: OffsetDateTime,
    pub month: time::Month,
}

impl SuggestionRequest {
    /// Builds a request whose month is taken from `now`.
    #[must_use]
    pub fn at(catalog: Vec<CatalogItem>, context: UserContext, now: OffsetDateTime) -> Self {
        Self {
            catalog,
            context,
            now,
            month: now.month(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub item: CatalogItem,
    pub score: i32,
    /// 1-based position in the ranked output.
    pub rank: usize,
}

pub trait CatalogProvider {
    fn load_catalog(&self) -> Result<Vec<CatalogItem>, StoreError>;
}

pub trait PreferenceProvider {
    fn load_preferences(&self) -> Result<Preferences, StoreError>;
}

pub trait HistoryRecorder {
    fn recent_history(&self) -> Result<Vec<HistoryEntry>, StoreError>;
    fn record_consumption(&mut self, event: ConsumptionEvent) -> Result<(), StoreError>;
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn catalog_item_defaults_missing_collections() {
        let item: CatalogItem = serde_json::from_value(json!({
            "id": "oats",
            "category": "breakfast",
            "durationMinutes": 10
        }))
        .expect("minimal item should deserialize");

        assert_eq!(item.prep_time_minutes, 10);
        assert_eq!(item.difficulty, Difficulty::Easy);
        assert!(item.symptom_targets.is_empty());
        assert!(item.season.is_empty());
        assert!(!item.mood_boosting);
        assert!(item.glycemic_index_category.is_none());
    }

    #[test]
    fn difficulty_is_ordered_and_kebab_cased() {
        assert!(Difficulty::VeryEasy < Difficulty::Easy);
        assert!(Difficulty::Medium < Difficulty::Advanced);
        assert_eq!(Difficulty::Medium.ordinal(), 3);
        assert_eq!(
            serde_json::to_value(Difficulty::VeryEasy).expect("serialize"),
            json!("very-easy")
        );
        let hard: Difficulty = serde_json::from_value(json!("hard")).expect("alias");
        assert_eq!(hard, Difficulty::Advanced);
    }

    #[test]
    fn category_filter_parses_sentinels() {
        assert_eq!(CategoryFilter::from("auto"), CategoryFilter::Auto);
        assert_eq!(CategoryFilter::from(" ANY "), CategoryFilter::Any);
        assert_eq!(
            CategoryFilter::from("Lunch"),
            CategoryFilter::Exact("Lunch".into())
        );

        let ctx: UserContext = serde_json::from_value(json!({
            "symptoms": ["fatigue"],
            "meal_type": "dinner",
            "hour": 19
        }))
        .expect("context should deserialize");
        assert_eq!(ctx.category, CategoryFilter::Exact("dinner".into()));
        assert!(ctx.recent_history.is_empty());
        assert_eq!(ctx.preferences, Preferences::default());
    }

    #[test]
    fn history_entry_uses_rfc3339() {
        let entry: HistoryEntry = serde_json::from_value(json!({
            "item_id": "oats",
            "consumed_at": "2024-03-01T08:30:00Z"
        }))
        .expect("history entry should deserialize");
        assert_eq!(entry.consumed_at.hour(), 8);

        let back = serde_json::to_string(&entry).expect("serialize");
        assert!(back.contains("2024-03-01T08:30:00Z"));
    }
}
