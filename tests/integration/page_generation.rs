//! Integration tests for two-phase page generation and the editorial pass

use crate::integration::test_utils::{
    draft_page, identity, orchestrator, score, structure_error, ScriptedBackend,
};
use pagecraft::error::ApiError;
use pagecraft::generation::{ContentProvenance, GenerationSettings, PageOverrides, SectionStatus};
use pagecraft::page::SectionKind;
use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;

#[tokio::test]
async fn test_reviewed_page_wins_over_draft() {
    let mut reviewed = draft_page();
    reviewed["title"] = json!("Tidewater Kayaks | Coastal adventures");
    let backend = ScriptedBackend::new(vec![Ok(draft_page()), Ok(reviewed)]);
    let orchestrator = orchestrator(backend.clone(), GenerationSettings::default());

    let page = orchestrator
        .generate_page_data(&identity(), None)
        .await
        .unwrap();

    assert_eq!(page.title, "Tidewater Kayaks | Coastal adventures");
    assert_eq!(
        page.section_order,
        vec![SectionKind::Hero, SectionKind::Services, SectionKind::Faq]
    );
    assert!(page.meta.fallback_sections.is_empty());
    assert!(page.meta.generated_at.is_some());
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn test_failed_review_keeps_the_draft() {
    let backend = ScriptedBackend::new(vec![Ok(draft_page()), structure_error()]);
    let orchestrator = orchestrator(backend.clone(), GenerationSettings::default());

    let page = orchestrator
        .generate_page_data(&identity(), None)
        .await
        .unwrap();

    assert_eq!(page.title, "Tidewater Kayaks");
    assert_eq!(page.hero.as_ref().unwrap().title, "Explore the coast");
    assert_eq!(page.services.as_ref().unwrap().items.len(), 2);
    assert!(page.meta.fallback_sections.is_empty());
}

#[tokio::test]
async fn test_review_with_mistyped_scalars_keeps_the_draft() {
    let mut reviewed = draft_page();
    reviewed["title"] = json!(42);
    let backend = ScriptedBackend::new(vec![Ok(draft_page()), Ok(reviewed)]);
    let orchestrator = orchestrator(backend, GenerationSettings::default());

    let page = orchestrator
        .generate_page_data(&identity(), None)
        .await
        .unwrap();
    assert_eq!(page.title, "Tidewater Kayaks");
}

#[tokio::test]
async fn test_review_with_invalid_section_keeps_the_draft() {
    let mut reviewed = draft_page();
    reviewed["title"] = json!("Tidewater Kayaks | Coastal adventures");
    reviewed["hero"] = json!({"subtitle": "no title"});
    let backend = ScriptedBackend::new(vec![Ok(draft_page()), Ok(reviewed)]);
    let orchestrator = orchestrator(backend.clone(), GenerationSettings::default());

    let page = orchestrator
        .generate_page_data(&identity(), None)
        .await
        .unwrap();

    // The reviewed object is rejected as a whole, not merged section by section.
    assert_eq!(page.title, "Tidewater Kayaks");
    assert_eq!(page.hero.as_ref().unwrap().title, "Explore the coast");
    assert!(!page.is_fallback(SectionKind::Hero));
    assert!(page.meta.fallback_sections.is_empty());
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn test_draft_with_invalid_section_is_fatal() {
    let mut draft = draft_page();
    draft["faq"] = json!({"title": "Questions", "items": "not a list"});
    let backend = ScriptedBackend::new(vec![Ok(draft), Ok(draft_page())]);
    let orchestrator = orchestrator(backend.clone(), GenerationSettings::default());

    let result = orchestrator.generate_page_data(&identity(), None).await;
    assert!(matches!(result, Err(ApiError::SchemaValidation { .. })));
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn test_failed_draft_is_fatal() {
    let backend = ScriptedBackend::new(vec![structure_error()]);
    let orchestrator = orchestrator(backend.clone(), GenerationSettings::default());

    let result = orchestrator.generate_page_data(&identity(), None).await;
    assert!(matches!(result, Err(ApiError::BackendStructure(_))));
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn test_non_object_draft_is_fatal() {
    let backend = ScriptedBackend::new(vec![Ok(json!(["hero", "services"]))]);
    let orchestrator = orchestrator(backend, GenerationSettings::default());

    let result = orchestrator.generate_page_data(&identity(), None).await;
    assert!(matches!(result, Err(ApiError::BackendStructure(_))));
}

#[tokio::test]
async fn test_sparse_output_is_completed_with_fallbacks() {
    let draft = json!({
        "section_order": ["hero", "faq", "pricing"],
        "hero": {"title": "Explore the coast"}
    });
    let backend = ScriptedBackend::new(vec![Ok(draft), structure_error()]);
    let orchestrator = orchestrator(backend, GenerationSettings::default());

    let page = orchestrator
        .generate_page_data(&identity(), None)
        .await
        .unwrap();

    // Scalars come from the identity.
    assert_eq!(page.title, "Tidewater Kayaks");
    assert_eq!(page.name, "Tidewater Kayaks");
    assert_eq!(page.tagline, "Paddle further");
    assert_eq!(
        page.description,
        "Small-group sea kayak trips with certified guides"
    );

    assert_eq!(
        page.section_order,
        vec![
            SectionKind::Hero,
            SectionKind::Faq,
            SectionKind::Pricing,
            SectionKind::Services
        ]
    );
    assert!(!page.is_fallback(SectionKind::Hero));
    for kind in [SectionKind::Faq, SectionKind::Pricing, SectionKind::Services] {
        assert!(page.is_fallback(kind), "{} should be fallback", kind);
        assert!(!page.section(kind).unwrap().enabled());
    }
    assert!(page.validate_structure().is_ok());
}

#[tokio::test]
async fn test_overrides_apply_after_generation() {
    let backend = ScriptedBackend::new(vec![Ok(draft_page()), structure_error()]);
    let orchestrator = orchestrator(backend, GenerationSettings::default());
    let overrides = PageOverrides {
        title: Some("Summer trips".to_string()),
        section_order: Some(vec![SectionKind::Faq, SectionKind::Hero, SectionKind::Cta]),
        ..Default::default()
    };

    let page = orchestrator
        .generate_page_data(&identity(), Some(&overrides))
        .await
        .unwrap();

    assert_eq!(page.title, "Summer trips");
    assert_eq!(page.tagline, "Paddle further");
    assert_eq!(page.section_order[..3], [SectionKind::Faq, SectionKind::Hero, SectionKind::Cta]);
    assert!(page.is_fallback(SectionKind::Cta));
    assert!(!page.is_fallback(SectionKind::Faq));
}

#[tokio::test]
async fn test_prompts_carry_guidelines_and_draft() {
    let backend = ScriptedBackend::new(vec![Ok(draft_page()), Ok(draft_page())]);
    let orchestrator = orchestrator(backend.clone(), GenerationSettings::default());
    orchestrator
        .generate_page_data(&identity(), None)
        .await
        .unwrap();

    let calls = backend.calls();
    assert_eq!(calls[0].schema, "page");
    assert!(calls[0].prompt.contains("Brand: Tidewater Kayaks"));
    assert!(calls[0].prompt.contains("adventurous, warm"));
    assert!(calls[1].prompt.contains("Brand: Tidewater Kayaks"));
    assert!(calls[1].prompt.contains("Island crossing"));
}

#[tokio::test]
async fn test_edit_keeps_bookkeeping_and_restores_dropped_sections() {
    let backend = ScriptedBackend::new(vec![
        Ok(draft_page()),
        structure_error(),
        Ok(json!({
            "sections": [
                score("hero", 0.9, 0.9),
                score("services", 0.9, 0.9),
                score("faq", 0.9, 0.9)
            ]
        })),
        Ok(json!({
            "title": "Tidewater Kayaks | Paddle further",
            "section_order": [],
            "hero": {"title": "Explore the coast", "subtitle": "Trips for every level"},
            "services": {"title": "Guided trips", "items": [{"name": "Sunset paddle"}]}
        })),
    ]);
    let orchestrator = orchestrator(backend.clone(), GenerationSettings::default());
    let identity = identity();

    let page = orchestrator
        .generate_page_data(&identity, None)
        .await
        .unwrap();
    let assessed = orchestrator
        .assess_quality(page, Some(&identity), None, false)
        .await
        .unwrap()
        .page;
    let outcome = orchestrator.edit_page(&assessed, None).await.unwrap();
    let edited = &outcome.page;

    assert_eq!(edited.title, "Tidewater Kayaks | Paddle further");
    assert_eq!(edited.description, assessed.description);
    assert_eq!(edited.section_order, assessed.section_order);
    assert_eq!(edited.faq, assessed.faq);
    assert_eq!(edited.services.as_ref().unwrap().title, "Guided trips");
    assert_eq!(edited.meta.generated_at, assessed.meta.generated_at);

    // Only the changed section loses its verdict.
    assert!(edited.meta.assessments.contains_key(&SectionKind::Hero));
    assert!(edited.meta.assessments.contains_key(&SectionKind::Faq));
    assert!(!edited.meta.assessments.contains_key(&SectionKind::Services));

    // Only the changed section is reported, with edited provenance.
    assert_eq!(
        outcome.sections.keys().copied().collect::<Vec<_>>(),
        vec![SectionKind::Services]
    );
    let services = &outcome.sections[&SectionKind::Services];
    assert_eq!(services.status, SectionStatus::Completed);
    assert_eq!(services.provenance, ContentProvenance::Edited);

    // No identity given to the edit, so no guidelines in its prompt.
    assert!(!backend.prompt(3).contains("Brand:"));
}

#[tokio::test]
async fn test_edit_rejects_unstructured_reply() {
    let backend = ScriptedBackend::new(vec![
        Ok(draft_page()),
        structure_error(),
        Ok(Value::String("looks good".to_string())),
    ]);
    let orchestrator = orchestrator(backend, GenerationSettings::default());
    let page = orchestrator
        .generate_page_data(&identity(), None)
        .await
        .unwrap();

    let result = orchestrator.edit_page(&page, Some(&identity())).await;
    assert!(matches!(result, Err(ApiError::BackendStructure(_))));
}

fn arbitrary_draft() -> impl Strategy<Value = (Vec<usize>, Vec<bool>)> {
    (
        prop::collection::vec(0..SectionKind::ALL.len(), 0..8),
        prop::collection::vec(any::<bool>(), SectionKind::ALL.len()),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_generated_pages_are_structurally_complete((order, present) in arbitrary_draft()) {
        let mut draft = Map::new();
        let names: Vec<&str> = order.iter().map(|i| SectionKind::ALL[*i].as_str()).collect();
        draft.insert("section_order".to_string(), json!(names));
        for (kind, present) in SectionKind::ALL.iter().zip(&present) {
            if *present {
                draft.insert(kind.as_str().to_string(), json!({"title": format!("{} copy", kind)}));
            }
        }

        let backend = ScriptedBackend::new(vec![Ok(Value::Object(draft)), structure_error()]);
        let orchestrator = orchestrator(backend, GenerationSettings::default());
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let page = runtime
            .block_on(orchestrator.generate_page_data(&identity(), None))
            .unwrap();

        prop_assert!(page.validate_structure().is_ok());
        prop_assert!(!page.section_order.is_empty());
        let unique: BTreeSet<_> = page.section_order.iter().collect();
        prop_assert_eq!(unique.len(), page.section_order.len());
        for kind in &page.section_order {
            prop_assert!(page.has_section(*kind));
        }
        for kind in SectionKind::REQUIRED {
            prop_assert!(page.has_section(kind));
        }
        for kind in &page.meta.fallback_sections {
            prop_assert!(page.section_order.contains(kind));
            prop_assert!(!page.section(*kind).unwrap().enabled());
        }
    }
}

#[tokio::test]
async fn test_edit_rejects_reply_with_invalid_section() {
    let mut edited = draft_page();
    edited["title"] = json!("Tidewater Kayaks | Paddle further");
    edited["services"] = json!({"title": "Trips", "items": [{"price": "$80"}]});
    let backend = ScriptedBackend::new(vec![Ok(draft_page()), structure_error(), Ok(edited)]);
    let orchestrator = orchestrator(backend, GenerationSettings::default());
    let page = orchestrator
        .generate_page_data(&identity(), None)
        .await
        .unwrap();

    let result = orchestrator.edit_page(&page, Some(&identity())).await;
    assert!(matches!(result, Err(ApiError::SchemaValidation { .. })));
}
