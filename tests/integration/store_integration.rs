//! Integration tests for the page store and serialized page updates

use crate::integration::test_utils::{draft_page, identity, orchestrator, segment_cache, SlowSectionBackend};
use pagecraft::api::PageApi;
use pagecraft::concurrency::PageLockManager;
use pagecraft::error::{ApiError, StorageError};
use pagecraft::generation::defaults::install_fallback;
use pagecraft::generation::GenerationSettings;
use pagecraft::page::{Page, SectionKind};
use pagecraft::quality::{QualityThresholds, SectionScore};
use pagecraft::store::{FilePageStore, PageStore};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn stored_page() -> Page {
    let mut page = Page::from_value(draft_page()).unwrap();
    install_fallback(&mut page, SectionKind::Cta);
    let assessment = QualityThresholds::default().evaluate(&SectionScore {
        section: SectionKind::Hero,
        quality_score: 0.9,
        confidence_score: 0.8,
        rationale: "Clear promise".to_string(),
        recommendations: Vec::new(),
    });
    page.meta.assessments.insert(SectionKind::Hero, assessment);
    page.meta.touch();
    page
}

#[test]
fn test_page_round_trip_keeps_bookkeeping() {
    let dir = TempDir::new().unwrap();
    let store = FilePageStore::new(dir.path()).unwrap();
    let page = stored_page();

    store.save_page("landing", &page).unwrap();
    let loaded = store.load_page("landing").unwrap().unwrap();

    assert_eq!(loaded, page);
    assert!(loaded.is_fallback(SectionKind::Cta));
    assert!(loaded.meta.assessments[&SectionKind::Hero].passed);
    assert!(dir.path().join("landing/page.json").is_file());
    assert!(!dir.path().join("landing/page.json.tmp").exists());
}

#[test]
fn test_identity_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = FilePageStore::new(dir.path()).unwrap();

    assert!(store.load_identity("landing").unwrap().is_none());
    store.save_identity("landing", &identity()).unwrap();
    assert_eq!(store.load_identity("landing").unwrap(), Some(identity()));
}

#[test]
fn test_list_pages_is_sorted_and_skips_incomplete_directories() {
    let dir = TempDir::new().unwrap();
    let store = FilePageStore::new(dir.path()).unwrap();
    for id in ["summer", "autumn", "winter"] {
        store.save_page(id, &stored_page()).unwrap();
    }
    store.save_identity("spring", &identity()).unwrap();

    assert_eq!(
        store.list_pages().unwrap(),
        vec!["autumn".to_string(), "summer".to_string(), "winter".to_string()]
    );
}

#[test]
fn test_unsafe_page_ids_are_rejected() {
    let dir = TempDir::new().unwrap();
    let store = FilePageStore::new(dir.path()).unwrap();
    for id in ["", "../escape", ".hidden", "with space", "a/b"] {
        assert!(
            matches!(
                store.save_page(id, &stored_page()),
                Err(StorageError::InvalidKey(_))
            ),
            "{:?} should be rejected",
            id
        );
    }
}

#[test]
fn test_corrupt_page_document_is_a_serialization_error() {
    let dir = TempDir::new().unwrap();
    let store = FilePageStore::new(dir.path()).unwrap();
    fs::create_dir_all(dir.path().join("broken")).unwrap();
    fs::write(dir.path().join("broken/page.json"), "{ not json").unwrap();

    assert!(matches!(
        store.load_page("broken"),
        Err(StorageError::Serialization { .. })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_updates_to_one_page_are_serialized() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FilePageStore::new(dir.path().join("pages")).unwrap());
    store
        .save_page("landing", &Page::from_value(draft_page()).unwrap())
        .unwrap();

    let backend = Arc::new(SlowSectionBackend {
        delay: Duration::from_millis(30),
    });
    let orchestrator = orchestrator(backend, GenerationSettings::default());
    let api = PageApi::new(
        store.clone(),
        segment_cache(&dir),
        Arc::new(orchestrator),
        Arc::new(PageLockManager::new()),
    );

    let (hero, faq) = tokio::join!(
        api.regenerate_sections("landing", &[SectionKind::Hero]),
        api.regenerate_sections("landing", &[SectionKind::Faq])
    );
    assert!(hero.unwrap().success);
    assert!(faq.unwrap().success);

    // Both updates land; neither overwrote the other with a stale copy.
    let page = api.view("landing").unwrap();
    assert_eq!(page.hero.as_ref().unwrap().title, "Fresh hero");
    assert_eq!(page.hero.as_ref().unwrap().subtitle, "Trips for every level");
    assert_eq!(page.faq.as_ref().unwrap().title, "Fresh faq");
    assert_eq!(page.faq.as_ref().unwrap().items.len(), 1);
}

#[tokio::test]
async fn test_updates_to_missing_pages_fail() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(SlowSectionBackend {
        delay: Duration::from_millis(1),
    });
    let api = PageApi::new(
        Arc::new(FilePageStore::new(dir.path().join("pages")).unwrap()),
        segment_cache(&dir),
        Arc::new(orchestrator(backend, GenerationSettings::default())),
        Arc::new(PageLockManager::new()),
    );

    assert!(matches!(
        api.regenerate_failed("nowhere").await,
        Err(ApiError::PageNotFound(_))
    ));
    assert!(matches!(
        api.assess("nowhere", None, false).await,
        Err(ApiError::PageNotFound(_))
    ));
    assert!(api.list_pages().unwrap().is_empty());
}

#[tokio::test]
async fn test_corrupt_identity_does_not_block_page_updates() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FilePageStore::new(dir.path().join("pages")).unwrap());
    store
        .save_page("landing", &Page::from_value(draft_page()).unwrap())
        .unwrap();
    fs::write(dir.path().join("pages/landing/identity.json"), "{corrupt").unwrap();

    let backend = Arc::new(SlowSectionBackend {
        delay: Duration::from_millis(1),
    });
    let api = PageApi::new(
        store,
        segment_cache(&dir),
        Arc::new(orchestrator(backend, GenerationSettings::default())),
        Arc::new(PageLockManager::new()),
    );

    let summary = api
        .regenerate_sections("landing", &[SectionKind::Hero])
        .await
        .unwrap();
    assert!(summary.success);
    assert_eq!(api.view("landing").unwrap().hero.unwrap().title, "Fresh hero");

    let summary = api.regenerate_failed("landing").await.unwrap();
    assert!(summary.success);

    // Without a usable identity there is nothing to generate from.
    assert!(matches!(
        api.generate("landing", None, None).await,
        Err(ApiError::IdentityNotFound(_))
    ));
}
