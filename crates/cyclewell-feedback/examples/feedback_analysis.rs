//! Example demonstrating suggestion outcome analysis and proposal generation.
//!
//! This example shows how cyclewell looks back at which suggestions were
//! taken up and proposes weight adjustments without modifying live weights.
//!
//! Run with: cargo run -p cyclewell-feedback --example feedback_analysis

use cyclewell_feedback::{FeedbackAnalyzer, OutcomeType, SuggestionOutcome};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== cyclewell: Suggestion Feedback Analysis ===\n");

    let outcomes = vec![
        // Breakfast repeats are mostly ignored
        create_outcome("s1", "overnight-oats", "breakfast", false, true),
        create_outcome("s2", "overnight-oats", "breakfast", false, true),
        create_outcome("s3", "peanut-toast", "breakfast", false, true),
        create_outcome("s4", "overnight-oats", "breakfast", false, true),
        create_outcome("s5", "peanut-toast", "breakfast", true, false),
        // Lunch works reasonably well
        create_outcome("s6", "salmon-bowl", "lunch", true, false),
        create_outcome("s7", "salmon-bowl", "lunch", false, true),
        create_outcome("s8", "salmon-bowl", "lunch", true, false),
        // Dinner is hit and miss
        create_outcome("s9", "lentil-soup", "dinner", false, true),
        create_outcome("s10", "lentil-soup", "dinner", false, false),
        create_outcome("s11", "lentil-soup", "dinner", true, false),
        create_outcome("s12", "lentil-soup", "dinner", false, true),
    ];

    println!("Analyzing {} suggestion outcomes...\n", outcomes.len());

    let analyzer = FeedbackAnalyzer::default();

    println!("Statistics by category:");
    let by_category = analyzer.aggregate_outcomes(&outcomes, |o| o.category.clone());
    for (category, stats) in &by_category {
        println!(
            "  {} -> accepted: {}/{} ({:.1}%), avg score: {:.1}",
            category,
            stats.accepted,
            stats.total,
            stats.acceptance_rate() * 100.0,
            stats.average_score()
        );
    }
    println!();

    println!("Identified patterns:");
    let patterns = analyzer.analyze_patterns(&outcomes);
    if patterns.is_empty() {
        println!("  (none detected with current thresholds)");
    } else {
        for pattern in &patterns {
            println!("  - {}", pattern);
        }
    }
    println!();

    match analyzer.propose_adjustment("default-weights-v1", &outcomes) {
        Some(proposal) => {
            println!("Proposal (status {:?}):", proposal.status);
            println!("{}", serde_json::to_string_pretty(&proposal)?);
        }
        None => println!("Not enough evidence for a proposal."),
    }

    Ok(())
}

fn create_outcome(
    id: &str,
    item_id: &str,
    category: &str,
    accepted: bool,
    repeat: bool,
) -> SuggestionOutcome {
    SuggestionOutcome {
        suggestion_id: id.to_string(),
        ts: "2024-06-01T08:00:00Z".to_string(),
        item_id: Some(item_id.to_string()),
        category: Some(category.to_string()),
        score: Some(if repeat { 70 } else { 85 }),
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
