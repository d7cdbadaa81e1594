//! Integration tests for the segment cache and its use as prompt context

use crate::integration::test_utils::{
    draft_page, identity, orchestrator, other_identity, segment_cache, structure_error,
    ScriptedBackend,
};
use pagecraft::error::ApiError;
use pagecraft::generation::defaults::install_fallback;
use pagecraft::generation::GenerationSettings;
use pagecraft::page::{Page, SectionKind};
use pagecraft::segment::{Segment, SegmentKind};
use tempfile::TempDir;

#[test]
fn test_segments_survive_a_restart_and_clear() {
    let dir = TempDir::new().unwrap();
    let page = Page::from_value(draft_page()).unwrap();
    let identity = identity();

    let cache = segment_cache(&dir);
    assert_eq!(cache.capture_page(&page, Some(&identity)), 3);
    assert!(dir.path().join("segments/conversion.json").is_file());

    let reloaded = segment_cache(&dir);
    let segments = reloaded.get_all_segments();
    assert_eq!(
        segments.keys().copied().collect::<Vec<_>>(),
        vec![
            SegmentKind::Identity,
            SegmentKind::ServiceOffering,
            SegmentKind::Conversion
        ]
    );
    let conversion = &segments[&SegmentKind::Conversion];
    assert!(conversion.matches_identity(&identity.fingerprint()));
    assert_eq!(
        conversion.section(SectionKind::Faq).unwrap()["title"],
        "Questions"
    );

    reloaded.clear_segment(SegmentKind::Conversion);
    assert!(!dir.path().join("segments/conversion.json").exists());
    assert!(!segment_cache(&dir).has_segment(SegmentKind::Conversion));

    reloaded.clear_all_segments();
    assert!(segment_cache(&dir).get_all_segments().is_empty());
}

#[test]
fn test_fallback_sections_are_not_captured() {
    let dir = TempDir::new().unwrap();
    let mut page = Page::from_value(draft_page()).unwrap();
    install_fallback(&mut page, SectionKind::Faq);
    install_fallback(&mut page, SectionKind::Testimonials);

    let cache = segment_cache(&dir);
    cache.capture_page(&page, Some(&identity()));

    assert!(!cache.has_segment(SegmentKind::Conversion));
    assert!(!cache.has_segment(SegmentKind::Credibility));
    assert!(cache.has_segment(SegmentKind::Identity));
}

#[test]
fn test_save_named_rejects_unknown_kinds() {
    let dir = TempDir::new().unwrap();
    let page = Page::from_value(draft_page()).unwrap();
    let segment = Segment::from_page(SegmentKind::Identity, &page, None).unwrap();
    let cache = segment_cache(&dir);

    assert!(matches!(
        cache.save_named("footer", segment.clone()),
        Err(ApiError::UnknownSegmentKind(_))
    ));
    cache.save_named("Service_Offering", segment).unwrap();
    let stored = cache.get_segment(SegmentKind::ServiceOffering).unwrap();
    assert_eq!(stored.kind, SegmentKind::ServiceOffering);
}

#[tokio::test]
async fn test_cached_sections_feed_later_drafts_for_the_same_identity() {
    let dir = TempDir::new().unwrap();
    let cache = segment_cache(&dir);
    let backend = ScriptedBackend::new(vec![
        Ok(draft_page()),
        structure_error(),
        Ok(draft_page()),
        structure_error(),
        Ok(draft_page()),
        structure_error(),
    ]);
    let orchestrator = orchestrator(backend.clone(), GenerationSettings::default())
        .with_segment_cache(cache.clone());

    orchestrator
        .generate_page_data(&identity(), None)
        .await
        .unwrap();
    assert_eq!(cache.get_all_segments().len(), 3);
    assert!(!backend
        .prompt(0)
        .contains("Previously approved sections for this brand"));

    orchestrator
        .generate_page_data(&identity(), None)
        .await
        .unwrap();
    let second = backend.prompt(2);
    assert!(second.contains("Previously approved sections for this brand"));
    assert!(second.contains("Island crossing"));

    orchestrator
        .generate_page_data(&other_identity(), None)
        .await
        .unwrap();
    assert!(!backend
        .prompt(4)
        .contains("Previously approved sections for this brand"));
}

#[tokio::test]
async fn test_section_prompts_offer_cached_content() {
    let dir = TempDir::new().unwrap();
    let cache = segment_cache(&dir);
    let backend = ScriptedBackend::new(vec![Ok(draft_page()), structure_error()]);
    let settings = GenerationSettings {
        max_retries: 1,
        ..Default::default()
    };
    let orchestrator = orchestrator(backend.clone(), settings).with_segment_cache(cache);
    let identity = identity();

    let mut page = orchestrator
        .generate_page_data(&identity, None)
        .await
        .unwrap();
    orchestrator
        .regenerate_sections(&mut page, Some(&identity), &[SectionKind::Faq])
        .await;
    orchestrator
        .regenerate_sections(&mut page, Some(&other_identity()), &[SectionKind::Faq])
        .await;

    assert!(backend
        .prompt(2)
        .contains("Previously approved content for this section"));
    assert!(!backend
        .prompt(3)
        .contains("Previously approved content for this section"));
}

#[tokio::test]
async fn test_disabled_reuse_neither_reads_nor_captures() {
    let dir = TempDir::new().unwrap();
    let cache = segment_cache(&dir);
    let backend = ScriptedBackend::new(vec![Ok(draft_page()), structure_error()]);
    let settings = GenerationSettings {
        reuse_segments: false,
        ..Default::default()
    };
    let orchestrator = orchestrator(backend, settings).with_segment_cache(cache.clone());

    orchestrator
        .generate_page_data(&identity(), None)
        .await
        .unwrap();
    assert!(cache.get_all_segments().is_empty());
}
