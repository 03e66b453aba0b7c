//! Caller-side wiring: load inputs from the store, then rank.
//!
//! Suggestions are a non-critical enhancement, so failed loads degrade to
//! empty inputs and a warning instead of surfacing as errors. Writes
//! (`track`) still report failures.

use cyclewell_core::{
    CatalogProvider, CategoryFilter, ConsumptionEvent, HistoryRecorder, PreferenceProvider,
    Preferences, ScoredCandidate, SuggestionRequest, UserContext,
};
use time::OffsetDateTime;

use crate::{Result, SuggestionEngine};

/// What the caller knows at request time, typically from today's journal
/// entry and the clock.
#[derive(Debug, Clone, Default)]
pub struct SuggestionQuery {
    pub symptoms: Vec<String>,
    pub cycle_phase: Option<String>,
    pub hour: u8,
    pub category: CategoryFilter,
    pub max_prep_time: Option<u32>,
}

#[derive(Debug)]
pub struct SuggestionService<S> {
    engine: SuggestionEngine,
    store: S,
    source: String,
}

impl<S> SuggestionService<S>
where
    S: CatalogProvider + PreferenceProvider + HistoryRecorder,
{
    pub fn new(engine: SuggestionEngine, store: S) -> Self {
        Self {
            engine,
            store,
            source: "cyclewell".to_string(),
        }
    }

    /// Source tag written into recorded consumption events.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn engine(&self) -> &SuggestionEngine {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads catalog, preferences and history and assembles a request.
    pub fn build_request(&self, query: &SuggestionQuery, now: OffsetDateTime) -> SuggestionRequest {
        let catalog = self.store.load_catalog().unwrap_or_else(|e| {
            log_warn!("failed to load catalog, suggesting nothing: {e}");
            Vec::new()
        });
        let preferences = self.store.load_preferences().unwrap_or_else(|e| {
            log_warn!("failed to load preferences, using defaults: {e}");
            Preferences::default()
        });
        let recent_history = self.store.recent_history().unwrap_or_else(|e| {
            log_warn!("failed to load consumption history, ignoring it: {e}");
            Vec::new()
        });

        let context = UserContext {
            symptoms: query.symptoms.clone(),
            cycle_phase: query.cycle_phase.clone(),
            hour: query.hour,
            category: query.category.clone(),
            max_prep_time: query.max_prep_time,
            preferences,
            recent_history,
        };
        SuggestionRequest::at(catalog, context, now)
    }

    #[must_use]
    pub fn suggest(&self, query: &SuggestionQuery, now: OffsetDateTime) -> Vec<ScoredCandidate> {
        let request = self.build_request(query, now);
        self.engine.generate_suggestions(&request)
    }

    #[must_use]
    pub fn quick(&self, query: &SuggestionQuery, now: OffsetDateTime) -> Option<ScoredCandidate> {
        let request = self.build_request(query, now);
        self.engine.quick_suggestion(&request)
    }

    /// Records that `item_id` was consumed at `at`.
    pub fn track(&mut self, item_id: &str, at: OffsetDateTime) -> Result<()> {
        let event = ConsumptionEvent::new(item_id, at, self.source.clone());
        self.store.record_consumption(event)?;
        log_debug!("recorded consumption of {item_id}");
        Ok(())
    }
}
