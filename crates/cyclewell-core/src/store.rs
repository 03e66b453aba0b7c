use crate::{
    CatalogItem, CatalogProvider, ConsumptionEvent, HistoryEntry, HistoryRecorder, Preferences,
    PreferenceProvider,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Keeps catalog, preferences and consumption history in memory.
///
/// Stands in for the hosted store in tests and embedded use.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    catalog: Vec<CatalogItem>,
    preferences: Preferences,
    history: Vec<HistoryEntry>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new(catalog: Vec<CatalogItem>, preferences: Preferences) -> Self {
        Self {
            catalog,
            preferences,
            history: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_history(mut self, history: Vec<HistoryEntry>) -> Self {
        self.history = history;
        self
    }

    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }
}

impl CatalogProvider for InMemoryStore {
    fn load_catalog(&self) -> Result<Vec<CatalogItem>, StoreError> {
        Ok(self.catalog.clone())
    }
}

impl PreferenceProvider for InMemoryStore {
    fn load_preferences(&self) -> Result<Preferences, StoreError> {
        Ok(self.preferences.clone())
    }
}

impl HistoryRecorder for InMemoryStore {
    fn recent_history(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        Ok(self.history.clone())
    }

    /// Rejects events for ids the catalog does not know.
    fn record_consumption(&mut self, event: ConsumptionEvent) -> Result<(), StoreError> {
        if !self.catalog.iter().any(|item| item.id == event.item_id) {
            return Err(StoreError::NotFound(event.item_id));
        }
        self.history.push(event.into());
        Ok(())
    }
}
