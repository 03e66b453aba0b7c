//! Weighted additive scoring of surviving candidates.

use cyclewell_core::{CatalogItem, Difficulty, GlycemicIndex, UserContext, ANY};
use time::Month;

use crate::config::ScoringWeights;

/// Symptom tags that make `mood_boosting` items relevant.
pub const MOOD_SYMPTOMS: &[&str] = &[
    "mood_swings",
    "irritability",
    "anxiety",
    "low_mood",
    "stress",
    "sadness",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Northern-hemisphere meteorological seasons.
    #[must_use]
    pub const fn from_month(month: Month) -> Self {
        match month {
            Month::March | Month::April | Month::May => Self::Spring,
            Month::June | Month::July | Month::August => Self::Summer,
            Month::September | Month::October | Month::November => Self::Autumn,
            Month::December | Month::January | Month::February => Self::Winter,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
            Self::Winter => "winter",
        }
    }
}

fn contains_tag(tags: &[String], tag: &str) -> bool {
    tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// Scores one candidate. Never negative.
#[must_use]
pub fn score_item(item: &CatalogItem, context: &UserContext, month: Month, weights: &ScoringWeights) -> i32 {
    let mut score = weights.base;

    // Intersection semantics: a symptom listed twice still counts once.
    let mut seen: Vec<&str> = Vec::with_capacity(context.symptoms.len());
    for symptom in &context.symptoms {
        if seen.iter().any(|s| s.eq_ignore_ascii_case(symptom)) {
            continue;
        }
        seen.push(symptom);
        if contains_tag(&item.symptom_targets, symptom) {
            score = score.saturating_add(weights.symptom_match);
        }
    }

    if let Some(phase) = context.cycle_phase.as_deref() {
        if contains_tag(&item.cycle_phases, phase) {
            score = score.saturating_add(weights.cycle_phase_match);
        }
    }
    if contains_tag(&item.cycle_phases, ANY) {
        score = score.saturating_add(weights.any_phase);
    }

    let repeats = context
        .recent_history
        .iter()
        .filter(|entry| entry.item_id == item.id)
        .count();
    let repeats = i32::try_from(repeats).unwrap_or(i32::MAX);
    score = score.saturating_sub(weights.history_penalty.saturating_mul(repeats));

    if item.glycemic_index_category == Some(GlycemicIndex::Low) {
        score = score.saturating_add(weights.low_glycemic);
    }

    let has_symptom = |tag: &str| contains_tag(&context.symptoms, tag);

    if item.mood_boosting && MOOD_SYMPTOMS.iter().any(|&tag| has_symptom(tag)) {
        score = score.saturating_add(weights.mood_boost);
    }
    if context.hour >= weights.evening_hour && item.difficulty == Difficulty::VeryEasy {
        score = score.saturating_add(weights.evening_easy);
    }
    if contains_tag(&item.season, Season::from_month(month).as_str()) {
        score = score.saturating_add(weights.season_match);
    }
    if has_symptom("fatigue") && contains_tag(&item.main_nutrients, "protein") {
        score = score.saturating_add(weights.fatigue_protein);
    }
    if has_symptom("period_pain") && contains_tag(&item.main_nutrients, "omega3") {
        score = score.saturating_add(weights.period_pain_omega3);
    }

    score.max(0)
}
