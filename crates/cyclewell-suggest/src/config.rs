//! Scoring weights and engine limits.

use crate::error::{Result, SuggestError};
use serde::{Deserialize, Serialize};

/// Default ceiling for `max_prep_time` when neither context nor preferences set one.
pub const DEFAULT_MAX_PREP_TIME: u32 = 30;
/// Default complexity ceiling (`easy`).
pub const DEFAULT_COMPLEXITY_CEILING: u8 = 2;
/// Items consumed within this many days are not suggested again.
pub const DEFAULT_RECENCY_DAYS: i64 = 3;
pub const DEFAULT_MAX_RESULTS: usize = 3;

/// Additive score contributions. Field names double as keys for weight
/// adjustment proposals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub base: i32,
    /// Per symptom shared between context and item.
    pub symptom_match: i32,
    pub cycle_phase_match: i32,
    /// Item is tagged for every phase.
    pub any_phase: i32,
    /// Subtracted per occurrence in the recent history.
    pub history_penalty: i32,
    pub low_glycemic: i32,
    pub mood_boost: i32,
    pub evening_easy: i32,
    /// First hour that counts as evening for `evening_easy`.
    pub evening_hour: u8,
    pub season_match: i32,
    pub fatigue_protein: i32,
    pub period_pain_omega3: i32,
    pub default_max_prep_time: u32,
    pub default_complexity_ceiling: u8,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            base: 50,
            symptom_match: 25,
            cycle_phase_match: 15,
            any_phase: 5,
            history_penalty: 5,
            low_glycemic: 15,
            mood_boost: 20,
            evening_easy: 10,
            evening_hour: 18,
            season_match: 5,
            fatigue_protein: 10,
            period_pain_omega3: 10,
            default_max_prep_time: DEFAULT_MAX_PREP_TIME,
            default_complexity_ceiling: DEFAULT_COMPLEXITY_CEILING,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: ScoringWeights,
    pub recency_days: i64,
    pub max_results: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            recency_days: DEFAULT_RECENCY_DAYS,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl EngineConfig {
    /// Strict check used when a config is supplied explicitly.
    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 {
            return Err(SuggestError::InvalidConfig(
                "max_results must be at least 1".into(),
            ));
        }
        if self.recency_days < 0 {
            return Err(SuggestError::InvalidConfig(format!(
                "recency_days must not be negative (got {})",
                self.recency_days
            )));
        }
        if self.weights.evening_hour > 23 {
            return Err(SuggestError::InvalidConfig(format!(
                "evening_hour must be within 0..=23 (got {})",
                self.weights.evening_hour
            )));
        }
        Ok(())
    }

    /// Lenient counterpart of [`validate`](Self::validate) used when restoring
    /// snapshots: out-of-range values are pulled back into range.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.recency_days = self.recency_days.max(0);
        if self.max_results == 0 {
            self.max_results = DEFAULT_MAX_RESULTS;
        }
        self.weights.evening_hour = self.weights.evening_hour.min(23);
        self
    }
}
