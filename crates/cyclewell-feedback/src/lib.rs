#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Suggestion outcome analysis and scoring weight proposals.
//!
//! This crate looks back at which suggestions were taken up and which were
//! skipped, and proposes changes to the engine's scoring weights. It follows
//! the principle: **cyclewell analyzes and proposes, never directly modifies
//! live weights**.

use cyclewell_core::ScoredCandidate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::BufRead;
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

// Confidence calculation constants
/// Sample size at which confidence plateaus (smaller = more generous)
const CONFIDENCE_SAMPLE_SIZE_PLATEAU: f32 = 50.0;
/// Confidence level when 2+ patterns detected (high confidence)
const CONFIDENCE_HIGH_PATTERN: f32 = 0.7;
/// Confidence level when <2 patterns detected (moderate confidence)
const CONFIDENCE_LOW_PATTERN: f32 = 0.5;
/// Weight for sample size component in confidence calculation
const CONFIDENCE_SAMPLE_WEIGHT: f32 = 0.4;
/// Weight for pattern count component in confidence calculation
const CONFIDENCE_PATTERN_WEIGHT: f32 = 0.6;

// Pattern detection thresholds
/// Minimum number of outcomes in a group before analyzing it
const PATTERN_MIN_OUTCOMES_PER_GROUP: usize = 5;
/// Skip rate (60%) above which a category or the repeat group is flagged
const PATTERN_HIGH_SKIP_THRESHOLD: f32 = 0.6;
/// Overall skip rate (50%) for system-wide issues
const PATTERN_OVERALL_SKIP_THRESHOLD: f32 = 0.5;

// Adjustments, keyed by `ScoringWeights` / `EngineConfig` field names
const HISTORY_PENALTY_KEY: &str = "history_penalty";
const HISTORY_PENALTY_DELTA: f32 = 5.0;
const RECENCY_DAYS_KEY: &str = "recency_days";
const RECENCY_DAYS_DELTA: f32 = 1.0;

/// Fallback timestamp when formatting fails
const FALLBACK_TIMESTAMP: &str = "1970-01-01T00:00:00Z";

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid outcome on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// What happened to one shown suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionOutcome {
    /// Reference to the suggestion as shown
    pub suggestion_id: String,
    /// Timestamp when the outcome was recorded
    pub ts: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Score the engine assigned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    /// The item had been consumed before (it carried a history penalty).
    #[serde(default)]
    pub repeat: bool,
    /// Classification of the outcome
    pub outcome: OutcomeType,
    /// Whether the suggestion was taken up.
    ///
    /// For [`OutcomeType::Accepted`] and [`OutcomeType::Skipped`], this should
    /// be consistent with `outcome`. For [`OutcomeType::Partial`] and
    /// [`OutcomeType::Unknown`], this flag drives classification.
    pub accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl SuggestionOutcome {
    /// Outcome record for a candidate the engine returned.
    #[must_use]
    pub fn from_candidate(
        suggestion_id: impl Into<String>,
        candidate: &ScoredCandidate,
        accepted: bool,
        repeat: bool,
    ) -> Self {
        Self {
            suggestion_id: suggestion_id.into(),
            ts: iso8601_now(),
            item_id: Some(candidate.item.id.clone()),
            category: Some(candidate.item.category.clone()),
            score: Some(candidate.score),
            repeat,
            outcome: if accepted {
                OutcomeType::Accepted
            } else {
                OutcomeType::Skipped
            },
            accepted,
            context: None,
            metadata: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeType {
    Accepted,
    Skipped,
    Partial,
    Unknown,
}

/// Evidence supporting a weight adjustment proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub outcomes_analyzed: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_rate_before: Option<f32>,
    /// Skip rate among suggestions of already-consumed items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_skip_rate: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<String>>,
}

/// Proposed weight adjustments based on suggestion outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightAdjustmentProposal {
    /// Version of the proposal format
    pub version: String,
    /// Identifier of the weight set being adjusted
    pub basis_policy: String,
    pub ts: String,
    /// Proposed adjustments keyed by config field name
    pub deltas: HashMap<String, DeltaValue>,
    /// Confidence in the proposed adjustments (0.0 to 1.0)
    pub confidence: f32,
    pub evidence: Evidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<Vec<String>>,
    #[serde(default)]
    pub status: ProposalStatus,
}

/// Value type for weight deltas with explicit kind and unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DeltaValue {
    #[serde(rename = "absolute")]
    Absolute { value: f32 },
    #[serde(rename = "relative")]
    Relative { value: f32, unit: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    #[default]
    Proposed,
    Accepted,
    Rejected,
    Superseded,
}

/// Statistics aggregated from suggestion outcomes.
#[derive(Debug, Default, Clone)]
pub struct OutcomeStatistics {
    /// Total number of outcomes (accepted + skipped).
    pub total: usize,
    pub accepted: usize,
    pub skipped: usize,
    /// Sum over outcomes that carry a score.
    pub total_score: i64,
    pub scored: usize,
}

impl OutcomeStatistics {
    fn record(&mut self, outcome: &SuggestionOutcome) {
        self.total += 1;
        if outcome_is_accepted(outcome) {
            self.accepted += 1;
        } else {
            self.skipped += 1;
        }
        if let Some(score) = outcome.score {
            self.total_score += i64::from(score);
            self.scored += 1;
        }
    }

    /// Acceptance rate (0.0 to 1.0).
    #[must_use]
    pub fn acceptance_rate(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            self.accepted as f32 / self.total as f32
        }
    }

    /// Skip rate (0.0 to 1.0).
    #[must_use]
    pub fn skip_rate(&self) -> f32 {
        debug_assert!(
            self.accepted + self.skipped == self.total,
            "OutcomeStatistics totals are inconsistent"
        );
        if self.total == 0 {
            return 0.0;
        }
        1.0 - self.acceptance_rate()
    }

    /// Average engine score over scored outcomes.
    #[must_use]
    pub fn average_score(&self) -> f32 {
        if self.scored == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            self.total_score as f32 / self.scored as f32
        }
    }
}

/// Analyzes suggestion outcomes and generates weight adjustment proposals.
#[derive(Debug)]
pub struct FeedbackAnalyzer {
    /// Minimum number of outcomes required before proposing adjustments
    min_outcomes: usize,
    /// Minimum confidence threshold for proposals
    min_confidence: f32,
}

impl Default for FeedbackAnalyzer {
    fn default() -> Self {
        Self {
            min_outcomes: 10,
            min_confidence: 0.5,
        }
    }
}

impl FeedbackAnalyzer {
    #[must_use]
    pub fn new(min_outcomes: usize, min_confidence: f32) -> Self {
        Self {
            min_outcomes,
            min_confidence: min_confidence.clamp(0.0, 1.0),
        }
    }

    /// Aggregate outcomes by a grouping key (e.g., category, item).
    #[must_use]
    pub fn aggregate_outcomes(
        &self,
        outcomes: &[SuggestionOutcome],
        key_fn: impl Fn(&SuggestionOutcome) -> Option<String>,
    ) -> HashMap<String, OutcomeStatistics> {
        let mut stats: HashMap<String, OutcomeStatistics> = HashMap::new();
        for outcome in outcomes {
            if let Some(key) = key_fn(outcome) {
                stats.entry(key).or_default().record(outcome);
            }
        }
        stats
    }

    fn summarize<'a>(&self, outcomes: impl IntoIterator<Item = &'a SuggestionOutcome>) -> OutcomeStatistics {
        let mut stats = OutcomeStatistics::default();
        for outcome in outcomes {
            stats.record(outcome);
        }
        stats
    }

    /// Heuristic pattern detection over the outcomes.
    #[must_use]
    pub fn analyze_patterns(&self, outcomes: &[SuggestionOutcome]) -> Vec<String> {
        let mut patterns = Vec::new();

        if outcomes.len() < self.min_outcomes {
            return patterns;
        }

        // Pattern 1: categories whose suggestions are mostly skipped
        let by_category = self.aggregate_outcomes(outcomes, |o| o.category.clone());
        let mut categories: Vec<_> = by_category.iter().collect();
        categories.sort_by(|a, b| a.0.cmp(b.0));
        for (category, stats) in categories {
            if stats.total >= PATTERN_MIN_OUTCOMES_PER_GROUP
                && stats.skip_rate() > PATTERN_HIGH_SKIP_THRESHOLD
            {
                patterns.push(format!(
                    "High skip rate ({:.1}%) for category '{}'",
                    stats.skip_rate() * 100.0,
                    category
                ));
            }
        }

        // Pattern 2: repeated items get skipped
        let repeats = self.summarize(outcomes.iter().filter(|o| o.repeat));
        if repeats.total >= PATTERN_MIN_OUTCOMES_PER_GROUP
            && repeats.skip_rate() > PATTERN_HIGH_SKIP_THRESHOLD
        {
            patterns.push(format!(
                "Repeated suggestions are skipped often ({:.1}%)",
                repeats.skip_rate() * 100.0
            ));
        }

        // Pattern 3: overall poor uptake
        let overall = self.summarize(outcomes);
        if overall.skip_rate() > PATTERN_OVERALL_SKIP_THRESHOLD {
            patterns.push(format!(
                "Overall skip rate is high ({:.1}%)",
                overall.skip_rate() * 100.0
            ));
        }

        patterns
    }

    /// Generate a weight adjustment proposal based on analyzed outcomes.
    ///
    /// Returns `None` if there is too little data or confidence is too low.
    #[must_use]
    pub fn propose_adjustment(
        &self,
        basis_policy: &str,
        outcomes: &[SuggestionOutcome],
    ) -> Option<WeightAdjustmentProposal> {
        if outcomes.len() < self.min_outcomes {
            return None;
        }

        let patterns = self.analyze_patterns(outcomes);
        if patterns.is_empty() {
            return None;
        }

        let overall = self.summarize(outcomes);
        let repeats = self.summarize(outcomes.iter().filter(|o| o.repeat));

        #[allow(clippy::cast_precision_loss)]
        let confidence = {
            let sample_confidence =
                (outcomes.len() as f32 / CONFIDENCE_SAMPLE_SIZE_PLATEAU).min(1.0);
            let pattern_confidence = if patterns.len() >= 2 {
                CONFIDENCE_HIGH_PATTERN
            } else {
                CONFIDENCE_LOW_PATTERN
            };
            (sample_confidence * CONFIDENCE_SAMPLE_WEIGHT
                + pattern_confidence * CONFIDENCE_PATTERN_WEIGHT)
                .clamp(0.0, 1.0)
        };

        if confidence < self.min_confidence {
            return None;
        }

        let mut deltas = HashMap::new();
        let mut reasoning = Vec::new();

        if repeats.total >= PATTERN_MIN_OUTCOMES_PER_GROUP
            && repeats.skip_rate() > PATTERN_HIGH_SKIP_THRESHOLD
        {
            deltas.insert(
                HISTORY_PENALTY_KEY.to_string(),
                DeltaValue::Absolute {
                    value: HISTORY_PENALTY_DELTA,
                },
            );
            reasoning.push(
                "Penalize repeats harder because repeated suggestions are skipped".to_string(),
            );
        }

        if overall.skip_rate() > PATTERN_OVERALL_SKIP_THRESHOLD {
            deltas.insert(
                RECENCY_DAYS_KEY.to_string(),
                DeltaValue::Absolute {
                    value: RECENCY_DAYS_DELTA,
                },
            );
            reasoning.push(
                "Widen the recency window because most suggestions are skipped".to_string(),
            );
        }

        // Category patterns alone have no weight to move.
        if deltas.is_empty() {
            return None;
        }

        Some(WeightAdjustmentProposal {
            version: "0.1.0".to_string(),
            basis_policy: basis_policy.to_string(),
            ts: iso8601_now(),
            deltas,
            confidence,
            evidence: Evidence {
                outcomes_analyzed: outcomes.len(),
                skip_rate_before: Some(overall.skip_rate()),
                repeat_skip_rate: (repeats.total > 0).then(|| repeats.skip_rate()),
                patterns: Some(patterns),
            },
            reasoning: Some(reasoning),
            status: ProposalStatus::Proposed,
        })
    }
}

/// Reads outcomes from JSON Lines, skipping blank lines.
pub fn read_outcomes(reader: impl BufRead) -> Result<Vec<SuggestionOutcome>, FeedbackError> {
    let mut outcomes = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let outcome = serde_json::from_str(&line)
            .map_err(|source| FeedbackError::Parse { line: idx + 1, source })?;
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

fn outcome_is_accepted(outcome: &SuggestionOutcome) -> bool {
    match outcome.outcome {
        OutcomeType::Accepted => {
            debug_assert!(outcome.accepted, "Accepted outcome marked as not accepted");
            true
        }
        OutcomeType::Skipped => {
            debug_assert!(!outcome.accepted, "Skipped outcome marked as accepted");
            false
        }
        OutcomeType::Partial | OutcomeType::Unknown => outcome.accepted,
    }
}

fn iso8601_now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| FALLBACK_TIMESTAMP.to_string())
}
