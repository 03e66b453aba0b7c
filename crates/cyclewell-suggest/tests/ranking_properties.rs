use cyclewell_core::{
    CatalogItem, CategoryFilter, HistoryEntry, Preferences, SuggestionRequest, UserContext,
};
use cyclewell_suggest::SuggestionEngine;
use time::macros::datetime;
use time::{Month, OffsetDateTime};

const NOW: OffsetDateTime = datetime!(2024-10-20 12:00 UTC);

fn catalog() -> Vec<CatalogItem> {
    serde_json::from_str(include_str!("../../../tests/fixtures/catalog/meals.ok.json"))
        .expect("catalog fixture should deserialize")
}

fn contexts() -> Vec<UserContext> {
    let mut out = Vec::new();
    for hour in [6u8, 11, 15, 19] {
        for category in [CategoryFilter::Auto, CategoryFilter::Any] {
            out.push(UserContext {
                hour,
                category: category.clone(),
                ..UserContext::default()
            });
            out.push(UserContext {
                hour,
                category,
                symptoms: vec!["fatigue".into(), "period_pain".into(), "mood_swings".into()],
                cycle_phase: Some("menstrual".into()),
                max_prep_time: Some(60),
                preferences: Preferences {
                    dietary_restrictions: vec!["vegetarian".into()],
                    preferred_complexity: Some(cyclewell_core::Difficulty::Medium),
                    ..Preferences::default()
                },
                recent_history: vec![HistoryEntry {
                    item_id: "lentil-soup".into(),
                    consumed_at: datetime!(2024-10-19 19:00 UTC),
                }],
            });
        }
    }
    out
}

fn request(context: UserContext) -> SuggestionRequest {
    SuggestionRequest {
        catalog: catalog(),
        context,
        now: NOW,
        month: Month::October,
    }
}

#[test]
fn output_is_bounded_ranked_and_non_negative() {
    let engine = SuggestionEngine::default();
    for context in contexts() {
        let result = engine.generate_suggestions(&request(context));
        assert!(result.len() <= 3);
        assert!(result.iter().all(|c| c.score >= 0));
        assert!(result.windows(2).all(|w| w[0].score >= w[1].score));
        for (idx, candidate) in result.iter().enumerate() {
            assert_eq!(candidate.rank, idx + 1);
        }
    }
}

#[test]
fn no_candidate_violates_active_filters() {
    let engine = SuggestionEngine::default();
    for context in contexts() {
        let limit = context
            .max_prep_time
            .unwrap_or(30)
            .min(context.preferences.max_prep_time.unwrap_or(30));
        let category = match &context.category {
            CategoryFilter::Auto => Some(match context.hour {
                0..=9 => "breakfast",
                10..=13 => "lunch",
                14..=16 => "snack",
                _ => "dinner",
            }),
            _ => None,
        };
        let vegetarian = !context.preferences.dietary_restrictions.is_empty();

        for candidate in engine.generate_suggestions(&request(context.clone())) {
            assert!(candidate.item.prep_time_minutes <= limit);
            if let Some(category) = category {
                assert_eq!(candidate.item.category, category);
            }
            if vegetarian {
                let text = candidate.item.ingredients_text.to_lowercase();
                assert!(!text.contains("salmon") && !text.contains("beef"));
            }
            // lentil-soup was eaten yesterday in the loaded contexts.
            if !context.recent_history.is_empty() {
                assert_ne!(candidate.item.id, "lentil-soup");
            }
        }
    }
}

#[test]
fn repeated_calls_are_deterministic() {
    let engine = SuggestionEngine::default();
    for context in contexts() {
        let req = request(context);
        assert_eq!(engine.generate_suggestions(&req), engine.generate_suggestions(&req));
    }
}

#[test]
fn dinner_ranking_for_a_tired_evening() {
    let engine = SuggestionEngine::default();
    let context = UserContext {
        hour: 19,
        symptoms: vec!["fatigue".into()],
        cycle_phase: Some("luteal".into()),
        ..UserContext::default()
    };

    let result = engine.generate_suggestions(&request(context));
    // beef-stew is too slow and too hard; lentil-soup is the only dinner left.
    // 50 + 25 fatigue + 15 luteal + 15 low GI + 5 autumn + 10 protein.
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].item.id, "lentil-soup");
    assert_eq!(result[0].score, 120);
}

#[test]
fn quick_suggestion_is_the_head_of_the_ranking() {
    let engine = SuggestionEngine::default();
    let context = UserContext {
        hour: 15,
        symptoms: vec!["mood_swings".into()],
        ..UserContext::default()
    };
    let req = request(context);

    let ranked = engine.generate_suggestions(&req);
    let quick = engine.quick_suggestion(&req).expect("one snack survives");
    assert_eq!(Some(&quick), ranked.first());
    assert_eq!(quick.item.id, "dark-chocolate-trail-mix");
    // 50 + 25 symptom + 20 mood boost.
    assert_eq!(quick.score, 95);
}
