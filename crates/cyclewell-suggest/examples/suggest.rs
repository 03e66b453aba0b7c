//! Reads a `UserContext` as JSON from stdin and ranks the fixture catalog.
//!
//! Run with: echo '{"hour": 8, "symptoms": ["fatigue"]}' | cargo run -p cyclewell-suggest --example suggest

use std::io::{self, Read};

use cyclewell_core::{CatalogItem, ScoredCandidate, SuggestionRequest, UserContext};
use cyclewell_suggest::SuggestionEngine;
use serde::Serialize;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

#[derive(Serialize)]
struct SuggestionRecord {
    ts: String,
    context: UserContext,
    suggestions: Vec<ScoredCandidate>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    let context: UserContext = if input.trim().is_empty() {
        UserContext::default()
    } else {
        serde_json::from_str(&input)?
    };

    let catalog: Vec<CatalogItem> =
        serde_json::from_str(include_str!("../../../tests/fixtures/catalog/meals.ok.json"))?;

    let now = OffsetDateTime::now_utc();
    let request = SuggestionRequest::at(catalog, context.clone(), now);
    let suggestions = SuggestionEngine::default().generate_suggestions(&request);

    let record = SuggestionRecord {
        ts: now
            .format(&Rfc3339)
            .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string()),
        context,
        suggestions,
    };

    serde_json::to_writer_pretty(io::stdout(), &record)?;
    println!();

    Ok(())
}
