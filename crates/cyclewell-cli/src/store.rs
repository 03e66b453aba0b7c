//! File-backed store: JSON catalog and preferences, JSONL consumption log.

use cyclewell_core::{
    CatalogItem, CatalogProvider, ConsumptionEvent, HistoryEntry, HistoryRecorder, Preferences,
    PreferenceProvider, StoreError,
};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileStore {
    catalog: PathBuf,
    preferences: PathBuf,
    history: PathBuf,
}

impl FileStore {
    pub fn new(catalog: PathBuf, preferences: PathBuf, history: PathBuf) -> Self {
        Self {
            catalog,
            preferences,
            history,
        }
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog
    }

    pub fn history_path(&self) -> &Path {
        &self.history
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

impl CatalogProvider for FileStore {
    fn load_catalog(&self) -> Result<Vec<CatalogItem>, StoreError> {
        if !self.catalog.exists() {
            return Err(StoreError::NotFound(self.catalog.display().to_string()));
        }
        read_json(&self.catalog)
    }
}

impl PreferenceProvider for FileStore {
    /// A missing preferences file means "no preferences".
    fn load_preferences(&self) -> Result<Preferences, StoreError> {
        if !self.preferences.exists() {
            return Ok(Preferences::default());
        }
        read_json(&self.preferences)
    }
}

impl HistoryRecorder for FileStore {
    fn recent_history(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        if !self.history.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(&self.history)?);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event: ConsumptionEvent = serde_json::from_str(&line)?;
            entries.push(event.into());
        }
        Ok(entries)
    }

    /// Appends one JSON line. When a catalog file exists, unknown ids are rejected.
    fn record_consumption(&mut self, event: ConsumptionEvent) -> Result<(), StoreError> {
        if self.catalog.exists() {
            let catalog = self.load_catalog()?;
            if !catalog.iter().any(|item| item.id == event.item_id) {
                return Err(StoreError::NotFound(event.item_id));
            }
        }
        if let Some(parent) = self.history.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.history)?;
        let line = serde_json::to_string(&event)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}
