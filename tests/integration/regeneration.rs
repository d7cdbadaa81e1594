//! Integration tests for quality assessment and failed-section regeneration

use crate::integration::test_utils::{
    draft_page, identity, orchestrator, score, structure_error, ScriptedBackend,
};
use pagecraft::generation::{ContentProvenance, GenerationSettings};
use pagecraft::page::{Page, SectionKind};
use pagecraft::prompt::PromptSet;
use pagecraft::quality::QualityThresholds;
use serde_json::json;

fn settings(max_retries: u32) -> GenerationSettings {
    GenerationSettings {
        max_retries,
        ..Default::default()
    }
}

fn faq_reply() -> serde_json::Value {
    json!({
        "title": "Before you book",
        "items": [{"question": "What should I wear?", "answer": "Quick-dry layers."}]
    })
}

#[tokio::test]
async fn test_apply_regenerates_failing_section() {
    let backend = ScriptedBackend::new(vec![
        Ok(draft_page()),
        structure_error(),
        Ok(json!({
            "sections": [
                score("hero", 0.9, 0.9),
                score("services", 0.9, 0.85),
                score("faq", 0.3, 0.4)
            ]
        })),
        Ok(faq_reply()),
    ]);
    let orchestrator = orchestrator(backend.clone(), settings(3));
    let identity = identity();
    let page = orchestrator
        .generate_page_data(&identity, None)
        .await
        .unwrap();

    let outcome = orchestrator
        .assess_quality(page, Some(&identity), None, true)
        .await
        .unwrap();

    assert_eq!(outcome.failing, vec![SectionKind::Faq]);
    assert!(outcome.success);
    let faq = &outcome.assessments[&SectionKind::Faq];
    assert!(!faq.passed);
    assert!((faq.combined_score - 0.35).abs() < 1e-9);
    assert!(outcome.assessments[&SectionKind::Hero].passed);

    let summary = outcome.regeneration.as_ref().unwrap();
    assert!(summary.success);
    assert_eq!(summary.succeeded, vec![SectionKind::Faq]);
    assert_eq!(summary.sections[&SectionKind::Faq].retry_count, 0);
    assert_eq!(
        summary.sections[&SectionKind::Faq].provenance,
        ContentProvenance::Generated
    );

    let page = &outcome.page;
    assert_eq!(page.faq.as_ref().unwrap().title, "Before you book");
    // The stale verdict goes with the old content; passing ones stay.
    assert!(!page.meta.assessments.contains_key(&SectionKind::Faq));
    assert!(page.meta.assessments.contains_key(&SectionKind::Hero));

    let prompts = PromptSet::default();
    let regen_prompt = backend.prompt(3);
    assert!(regen_prompt.contains("You are writing the `faq` section"));
    assert!(regen_prompt.contains("Is there an age limit?"));
    assert!(regen_prompt.contains(&prompts.retry_instruction));
    assert!(!regen_prompt.contains(&prompts.simplify_instruction));
}

#[tokio::test]
async fn test_apply_falls_back_when_retries_run_out() {
    let backend = ScriptedBackend::new(vec![
        Ok(draft_page()),
        structure_error(),
        Ok(json!({ "sections": [score("faq", 0.1, 0.2)] })),
        structure_error(),
        structure_error(),
    ]);
    let orchestrator = orchestrator(backend.clone(), settings(2));
    let identity = identity();
    let page = orchestrator
        .generate_page_data(&identity, None)
        .await
        .unwrap();

    let outcome = orchestrator
        .assess_quality(page, Some(&identity), None, true)
        .await
        .unwrap();

    assert!(!outcome.success);
    let summary = outcome.regeneration.as_ref().unwrap();
    assert!(!summary.success);
    assert_eq!(summary.failed, vec![SectionKind::Faq]);
    assert_eq!(summary.sections[&SectionKind::Faq].retry_count, 2);
    assert!(summary.message.contains("faq"));

    assert!(outcome.page.is_fallback(SectionKind::Faq));
    assert!(!outcome.page.faq.as_ref().unwrap().enabled);
    assert_eq!(backend.call_count(), 5);

    let prompts = PromptSet::default();
    assert!(!backend.prompt(3).contains(&prompts.simplify_instruction));
    assert!(backend.prompt(4).contains(&prompts.simplify_instruction));
}

#[tokio::test]
async fn test_assess_without_apply_only_records_verdicts() {
    let backend = ScriptedBackend::new(vec![
        Ok(draft_page()),
        structure_error(),
        Ok(json!({
            "sections": [
                score("hero", 0.9, 0.9),
                score("services", 0.8, 0.8),
                score("faq", 0.85, 0.9)
            ]
        })),
    ]);
    let orchestrator = orchestrator(backend.clone(), settings(3));
    let identity = identity();
    let page = orchestrator
        .generate_page_data(&identity, None)
        .await
        .unwrap();
    let strict = QualityThresholds {
        min_combined: 0.95,
        ..Default::default()
    };

    let outcome = orchestrator
        .assess_quality(page.clone(), Some(&identity), Some(strict), false)
        .await
        .unwrap();

    assert_eq!(
        outcome.failing,
        vec![SectionKind::Hero, SectionKind::Services, SectionKind::Faq]
    );
    assert!(outcome.regeneration.is_none());
    assert!(outcome.success);
    assert_eq!(outcome.page.faq, page.faq);
    assert_eq!(outcome.page.meta.assessments.len(), 3);
    assert!(outcome.page.meta.updated_at.is_some());
    assert_eq!(backend.call_count(), 3);

    let assess_prompt = backend.prompt(2);
    assert!(assess_prompt.contains("[hero, services, faq]"));
}

#[tokio::test]
async fn test_regenerate_failed_covers_fallback_sections() {
    let draft = json!({
        "title": "Tidewater Kayaks",
        "section_order": ["hero", "services", "pricing"],
        "hero": {"title": "Explore the coast"}
    });
    let backend = ScriptedBackend::new(vec![
        Ok(draft),
        structure_error(),
        Ok(json!({"title": "Trips", "items": [{"name": "Sunset paddle"}]})),
        structure_error(),
        structure_error(),
    ]);
    let orchestrator = orchestrator(backend.clone(), settings(2));
    let identity = identity();
    let mut page = orchestrator
        .generate_page_data(&identity, None)
        .await
        .unwrap();
    assert!(page.is_fallback(SectionKind::Services));
    assert!(page.is_fallback(SectionKind::Pricing));

    let summary = orchestrator
        .regenerate_failed_sections(&mut page, Some(&identity))
        .await;

    assert!(!summary.success);
    assert_eq!(summary.succeeded, vec![SectionKind::Services]);
    assert_eq!(summary.failed, vec![SectionKind::Pricing]);
    assert_eq!(summary.sections[&SectionKind::Services].retry_count, 0);
    assert_eq!(summary.sections[&SectionKind::Pricing].retry_count, 2);
    assert_eq!(
        summary.sections[&SectionKind::Pricing].provenance,
        ContentProvenance::Fallback
    );

    assert!(!page.is_fallback(SectionKind::Services));
    assert!(page.services.as_ref().unwrap().enabled);
    assert!(page.is_fallback(SectionKind::Pricing));
    assert!(!page.pricing.as_ref().unwrap().enabled);
    assert!(page.validate_structure().is_ok());
    assert_eq!(backend.call_count(), 5);

    // Fallback content is never offered as the current section.
    assert!(backend.prompt(2).contains("Current section: none"));
}

#[tokio::test]
async fn test_schema_violation_counts_as_failed_attempt() {
    let backend = ScriptedBackend::new(vec![
        Ok(json!({"items": []})),
        Ok(faq_reply()),
    ]);
    let orchestrator = orchestrator(backend.clone(), settings(3));
    let mut page = Page::from_value(draft_page()).unwrap();

    let summary = orchestrator
        .regenerate_sections(&mut page, Some(&identity()), &[SectionKind::Faq])
        .await;

    assert!(summary.success);
    assert_eq!(summary.sections[&SectionKind::Faq].retry_count, 1);
    assert_eq!(page.faq.as_ref().unwrap().title, "Before you book");
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn test_zero_retries_still_makes_one_attempt() {
    let backend = ScriptedBackend::new(vec![structure_error()]);
    let orchestrator = orchestrator(backend.clone(), settings(0));
    let mut page = Page::from_value(draft_page()).unwrap();

    let summary = orchestrator
        .regenerate_sections(&mut page, None, &[SectionKind::Hero])
        .await;

    assert_eq!(backend.call_count(), 1);
    assert_eq!(summary.failed, vec![SectionKind::Hero]);
    assert!(page.is_fallback(SectionKind::Hero));
}

#[tokio::test]
async fn test_regenerating_an_absent_section_adds_it() {
    let backend = ScriptedBackend::new(vec![Ok(json!({
        "title": "Ready to paddle?",
        "button_text": "Book a trip"
    }))]);
    let orchestrator = orchestrator(backend, settings(1));
    let mut page = Page::from_value(draft_page()).unwrap();

    let summary = orchestrator
        .regenerate_sections(&mut page, None, &[SectionKind::Cta])
        .await;

    assert!(summary.success);
    assert_eq!(page.section_order.last(), Some(&SectionKind::Cta));
    assert_eq!(page.cta.as_ref().unwrap().button_text, "Book a trip");
}

#[tokio::test]
async fn test_clean_page_needs_no_regeneration() {
    let backend = ScriptedBackend::new(Vec::new());
    let orchestrator = orchestrator(backend.clone(), settings(3));
    let mut page = Page::from_value(draft_page()).unwrap();

    let summary = orchestrator
        .regenerate_failed_sections(&mut page, None)
        .await;

    assert!(summary.success);
    assert!(summary.sections.is_empty());
    assert_eq!(backend.call_count(), 0);
}
