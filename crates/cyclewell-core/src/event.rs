//! Datenstrukturen für Verzehr- und Aktivitäts-Events.
//!
//! Dieses Modul definiert das [`ConsumptionEvent`], das als Austauschformat
//! für "Eintrag wurde genutzt"-Ereignisse dient. Solche Events stammen aus der
//! App (Mahlzeit gegessen, Übung absolviert), aus Importen oder aus der CLI
//! und speisen später die `recent_history` einer Anfrage.

use crate::HistoryEntry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Repräsentiert die Nutzung eines Katalog-Eintrags zu einem Zeitpunkt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsumptionEvent {
    /// Eine eindeutige Kennung für dieses Ereignis, z. B. eine UUID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Die `id` des genutzten Katalog-Eintrags.
    pub item_id: String,
    /// RFC-3339-Zeitstempel der Nutzung.
    #[serde(with = "time::serde::rfc3339")]
    pub consumed_at: OffsetDateTime,
    /// Die Quelle des Ereignisses (z. B. "app", "cli", "import").
    pub source: String,
    /// Optionale Tags, etwa die Mahlzeit oder der Anlass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Zusätzliche Metadaten, die nicht in die Bewertung einfließen, aber für
    /// Logging oder Debugging nützlich sein können.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<BTreeMap<String, Value>>,
}

impl ConsumptionEvent {
    #[must_use]
    pub fn new(item_id: impl Into<String>, consumed_at: OffsetDateTime, source: impl Into<String>) -> Self {
        Self {
            id: None,
            item_id: item_id.into(),
            consumed_at,
            source: source.into(),
            tags: None,
            meta: None,
        }
    }
}

impl From<&ConsumptionEvent> for HistoryEntry {
    fn from(event: &ConsumptionEvent) -> Self {
        HistoryEntry {
            item_id: event.item_id.clone(),
            consumed_at: event.consumed_at,
        }
    }
}

impl From<ConsumptionEvent> for HistoryEntry {
    fn from(event: ConsumptionEvent) -> Self {
        HistoryEntry {
            item_id: event.item_id,
            consumed_at: event.consumed_at,
        }
    }
}
