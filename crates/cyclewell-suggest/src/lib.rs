#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Regelbasierte Rangfolge für Mahlzeiten- und Aktivitätsvorschläge.
//!
//! Die [`SuggestionEngine`] bekommt einen Katalog und einen
//! [`UserContext`](cyclewell_core::UserContext) und liefert die besten
//! Kandidaten. Sie ist zustandslos zwischen Aufrufen: Uhrzeit und Monat kommen
//! über die [`SuggestionRequest`] herein, nie aus der Systemuhr.
//!
//! Ablauf: Kategorie auflösen, Basisfilter (Kategorie, Zeit, Komplexität),
//! Ausschluss kürzlich genutzter Einträge, Ernährungsfilter, dann Bewertung
//! und stabile Sortierung.

/// Warnungen laufen mit `telemetry` über `tracing::warn!`, sonst über `eprintln!`.
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "telemetry")]
        tracing::warn!($($arg)*);
        #[cfg(not(feature = "telemetry"))]
        eprintln!($($arg)*);
    }};
}

/// Debug-Ausgaben gibt es nur mit `telemetry`.
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "telemetry")]
        tracing::debug!($($arg)*);
        #[cfg(not(feature = "telemetry"))]
        let _ = || format!($($arg)*);
    }};
}

pub mod config;
pub mod error;
pub mod filter;
pub mod score;
pub mod service;

use cyclewell_core::{CatalogItem, ScoredCandidate, SuggestionRequest};
use serde_json::Value;

pub use config::{EngineConfig, ScoringWeights};
pub use error::{Result, SuggestError};
pub use service::{SuggestionQuery, SuggestionService};

/// Stateless ranking engine. Holds only its configuration.
#[derive(Debug, Clone, Default)]
pub struct SuggestionEngine {
    config: EngineConfig,
}

impl SuggestionEngine {
    /// Builds an engine from an explicit config, rejecting invalid values.
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ranks the catalog against the context and returns at most
    /// `max_results` candidates, best first. Equal scores keep catalog order.
    #[must_use]
    pub fn generate_suggestions(&self, request: &SuggestionRequest) -> Vec<ScoredCandidate> {
        let ctx = &request.context;
        let weights = &self.config.weights;

        let category = filter::resolve_category(&ctx.category, ctx.hour);
        let max_minutes = filter::prep_time_limit(ctx, weights);
        let ceiling = filter::complexity_ceiling(&ctx.preferences, weights);

        let basic: Vec<&CatalogItem> = request
            .catalog
            .iter()
            .filter(|item| filter::passes_basic(item, category.as_deref(), max_minutes, ceiling))
            .collect();
        log_debug!(
            "basic filter: {} of {} items left (category {:?}, <= {} min, complexity <= {})",
            basic.len(),
            request.catalog.len(),
            category,
            max_minutes,
            ceiling
        );

        let fresh = filter::exclude_recent(
            basic,
            &ctx.recent_history,
            request.now,
            self.config.recency_days,
        );
        log_debug!("recency exclusion: {} items left", fresh.len());

        let allowed = filter::filter_dietary(fresh, &ctx.preferences);
        log_debug!("dietary filter: {} items left", allowed.len());

        let mut scored: Vec<(i32, &CatalogItem)> = allowed
            .into_iter()
            .map(|item| (score::score_item(item, ctx, request.month, weights), item))
            .collect();
        // sort_by is stable, ties stay in catalog order.
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        scored
            .into_iter()
            .take(self.config.max_results)
            .enumerate()
            .map(|(idx, (score, item))| ScoredCandidate {
                item: item.clone(),
                score,
                rank: idx + 1,
            })
            .collect()
    }

    /// Top candidate only, for dashboard-style callers.
    #[must_use]
    pub fn quick_suggestion(&self, request: &SuggestionRequest) -> Option<ScoredCandidate> {
        self.generate_suggestions(request).into_iter().next()
    }

    /// Persists the engine config as JSON.
    pub fn snapshot(&self) -> Result<Value> {
        Ok(serde_json::to_value(&self.config)?)
    }

    /// Restores the config from a snapshot. Missing keys keep their defaults,
    /// out-of-range values are clamped.
    pub fn load(&mut self, snapshot: Value) -> Result<()> {
        let config: EngineConfig = serde_json::from_value(snapshot)?;
        let clamped = config.clone().clamped();
        if clamped != config {
            log_warn!("engine snapshot contained out-of-range values; clamped");
        }
        self.config = clamped;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use cyclewell_core::{CategoryFilter, HistoryEntry, Preferences, UserContext};
    use serde_json::json;
    use time::macros::datetime;
    use time::{Month, OffsetDateTime};

    const NOW: OffsetDateTime = datetime!(2024-01-15 08:00 UTC);

    fn item(id: &str, category: &str) -> CatalogItem {
        serde_json::from_value(json!({
            "id": id,
            "category": category,
            "prep_time_minutes": 10,
            "difficulty": "easy"
        }))
        .unwrap()
    }

    fn request(catalog: Vec<CatalogItem>, context: UserContext) -> SuggestionRequest {
        SuggestionRequest {
            catalog,
            context,
            now: NOW,
            month: Month::January,
        }
    }

    fn breakfast_context() -> UserContext {
        UserContext {
            hour: 8,
            ..UserContext::default()
        }
    }

    fn ids(result: &[ScoredCandidate]) -> Vec<&str> {
        result.iter().map(|c| c.item.id.as_str()).collect()
    }

    #[test]
    fn empty_catalog_yields_empty_result() {
        let engine = SuggestionEngine::default();
        let req = request(vec![], breakfast_context());
        assert!(engine.generate_suggestions(&req).is_empty());
        assert!(engine.quick_suggestion(&req).is_none());
    }

    #[test]
    fn auto_category_keeps_only_breakfast_items() {
        let engine = SuggestionEngine::default();
        let catalog = vec![
            item("b1", "breakfast"),
            item("l1", "lunch"),
            item("b2", "breakfast"),
            item("d1", "dinner"),
            item("b3", "breakfast"),
            item("b4", "breakfast"),
        ];
        let result = engine.generate_suggestions(&request(catalog, breakfast_context()));

        assert_eq!(ids(&result), vec!["b1", "b2", "b3"]);
        assert!(result.iter().all(|c| c.item.category == "breakfast"));
        assert_eq!(
            result.iter().map(|c| c.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn ties_keep_catalog_order_and_higher_scores_lead() {
        let engine = SuggestionEngine::default();
        let mut boosted = item("boosted", "breakfast");
        boosted.symptom_targets = vec!["bloating".into()];
        let catalog = vec![item("first", "breakfast"), item("second", "breakfast"), boosted];
        let context = UserContext {
            symptoms: vec!["bloating".into()],
            ..breakfast_context()
        };

        let result = engine.generate_suggestions(&request(catalog, context));
        assert_eq!(ids(&result), vec!["boosted", "first", "second"]);
        assert_eq!(result[0].score, 75);
        assert_eq!(result[1].score, result[2].score);
    }

    #[test]
    fn recently_consumed_item_is_excluded_even_if_best() {
        let engine = SuggestionEngine::default();
        let mut star = item("star", "breakfast");
        star.symptom_targets = vec!["fatigue".into()];
        let context = UserContext {
            symptoms: vec!["fatigue".into()],
            recent_history: vec![HistoryEntry {
                item_id: "star".into(),
                consumed_at: datetime!(2024-01-14 08:00 UTC),
            }],
            ..breakfast_context()
        };

        let result =
            engine.generate_suggestions(&request(vec![star, item("other", "breakfast")], context));
        assert_eq!(ids(&result), vec!["other"]);
    }

    #[test]
    fn older_repeats_are_kept_with_penalty() {
        let engine = SuggestionEngine::default();
        let old = HistoryEntry {
            item_id: "repeat".into(),
            consumed_at: datetime!(2024-01-10 08:00 UTC),
        };
        let context = UserContext {
            recent_history: vec![old.clone(), old],
            ..breakfast_context()
        };
        let catalog = vec![item("repeat", "breakfast"), item("fresh", "breakfast")];

        let result = engine.generate_suggestions(&request(catalog, context));
        assert_eq!(ids(&result), vec!["fresh", "repeat"]);
        assert_eq!(result[0].score - result[1].score, 10);
    }

    #[test]
    fn allergy_excludes_regardless_of_score() {
        let engine = SuggestionEngine::default();
        let mut toast = item("toast", "breakfast");
        toast.ingredients_text = "Peanut butter toast".into();
        toast.symptom_targets = vec!["fatigue".into()];
        let context = UserContext {
            symptoms: vec!["fatigue".into()],
            preferences: Preferences {
                allergies: vec!["peanut".into()],
                ..Preferences::default()
            },
            ..breakfast_context()
        };

        assert!(engine
            .generate_suggestions(&request(vec![toast], context))
            .is_empty());
    }

    #[test]
    fn any_category_disables_filter_and_max_results_applies() {
        let config = EngineConfig {
            max_results: 2,
            ..EngineConfig::default()
        };
        let engine = SuggestionEngine::with_config(config).unwrap();
        let context = UserContext {
            category: CategoryFilter::Any,
            ..breakfast_context()
        };
        let catalog = vec![item("a", "dinner"), item("b", "yoga"), item("c", "lunch")];

        let result = engine.generate_suggestions(&request(catalog, context));
        assert_eq!(ids(&result), vec!["a", "b"]);
    }

    #[test]
    fn identical_requests_give_identical_output() {
        let engine = SuggestionEngine::default();
        let catalog: Vec<CatalogItem> =
            serde_json::from_str(include_str!("../../../tests/fixtures/catalog/meals.ok.json"))
                .unwrap();
        let context = UserContext {
            symptoms: vec!["fatigue".into()],
            category: CategoryFilter::Any,
            ..breakfast_context()
        };
        let req = request(catalog, context);

        assert_eq!(engine.generate_suggestions(&req), engine.generate_suggestions(&req));
    }

    #[test]
    fn snapshot_roundtrip_and_clamping_load() {
        let mut engine = SuggestionEngine::default();
        let snap = engine.snapshot().unwrap();
        assert_eq!(snap["weights"]["base"], json!(50));
        assert_eq!(snap["recency_days"], json!(3));

        engine
            .load(json!({"recency_days": -2, "max_results": 0, "weights": {"mood_boost": 30}}))
            .unwrap();
        assert_eq!(engine.config().recency_days, 0);
        assert_eq!(engine.config().max_results, 3);
        assert_eq!(engine.config().weights.mood_boost, 30);
        assert_eq!(engine.config().weights.base, 50);

        assert!(matches!(
            engine.load(json!({"max_results": "many"})),
            Err(SuggestError::Snapshot(_))
        ));
    }

    #[test]
    fn loaded_extreme_weights_still_rank() {
        let mut engine = SuggestionEngine::default();
        engine
            .load(json!({"weights": {"base": 2_147_483_600, "symptom_match": 100}}))
            .unwrap();

        let mut target = item("stew", "dinner");
        target.symptom_targets = vec!["fatigue".into()];
        let context = UserContext {
            hour: 19,
            symptoms: vec!["fatigue".into()],
            ..UserContext::default()
        };
        let result = engine.generate_suggestions(&request(vec![item("soup", "dinner"), target], context));

        assert_eq!(ids(&result), vec!["stew", "soup"]);
        assert_eq!(result[0].score, i32::MAX);
        assert!(result[1].score > 0);
    }
}
