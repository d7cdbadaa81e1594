//! Page API
//!
//! Entry point for every page workflow. Loads the stored page and identity,
//! runs the orchestrator under the page's lock, and persists the result.
//! Components are built once and injected; nothing here is global.

use crate::concurrency::PageLockManager;
use crate::config::PagecraftConfig;
use crate::error::ApiError;
use crate::generation::{EditOutcome, PageOrchestrator, PageOverrides, QualityOutcome};
use crate::identity::BrandIdentity;
use crate::page::{Page, SectionKind};
use crate::prompt::PromptSet;
use crate::provider::{GenerativeBackend, ModelProviderClient, ProviderBackend, ProviderFactory};
use crate::quality::QualityThresholds;
use crate::regeneration::RegenerationSummary;
use crate::segment::{FileSegmentStorage, SegmentCache, SegmentKind, SegmentStore};
use crate::store::{validate_page_id, FilePageStore, PageStore};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct PageApi {
    store: Arc<dyn PageStore>,
    segments: Arc<SegmentCache>,
    orchestrator: Arc<PageOrchestrator>,
    lock_manager: Arc<PageLockManager>,
}

impl PageApi {
    pub fn new(
        store: Arc<dyn PageStore>,
        segments: Arc<SegmentCache>,
        orchestrator: Arc<PageOrchestrator>,
        lock_manager: Arc<PageLockManager>,
    ) -> Self {
        Self {
            store,
            segments,
            orchestrator,
            lock_manager,
        }
    }

    /// Wire file-backed storage, prompts and the segment cache around `backend`
    /// as described by `config`.
    pub fn from_config(
        config: &PagecraftConfig,
        workspace_root: &Path,
        backend: Arc<dyn GenerativeBackend>,
    ) -> Result<Self, ApiError> {
        let store = Arc::new(FilePageStore::new(
            config.storage.pages_path(workspace_root),
        )?);
        let segment_storage = Arc::new(FileSegmentStorage::new(
            config.storage.segments_path(workspace_root),
        )?);
        let segments = Arc::new(SegmentCache::new(segment_storage));

        let template_dir = config
            .prompts
            .template_dir
            .as_ref()
            .map(|dir| workspace_root.join(dir));
        let prompts = Arc::new(PromptSet::load(template_dir.as_deref())?);

        let orchestrator = PageOrchestrator::new(backend, prompts, config.generation.settings())
            .with_segment_cache(segments.clone());

        Ok(Self::new(
            store,
            segments,
            Arc::new(orchestrator),
            Arc::new(PageLockManager::new()),
        ))
    }

    pub fn orchestrator(&self) -> &PageOrchestrator {
        &self.orchestrator
    }

    pub fn segment_cache(&self) -> &SegmentCache {
        &self.segments
    }

    /// Store the identity pages under `page_id` are generated for.
    pub async fn set_identity(
        &self,
        page_id: &str,
        identity: &BrandIdentity,
    ) -> Result<(), ApiError> {
        validate_page_id(page_id)?;
        identity
            .validate()
            .map_err(|e| ApiError::schema("identity", e))?;
        let lock = self.lock_manager.get_lock(page_id);
        let _guard = lock.lock().await;
        self.store.save_identity(page_id, identity)?;
        info!(page_id, brand = %identity.name, "Identity stored");
        Ok(())
    }

    pub fn identity(&self, page_id: &str) -> Result<BrandIdentity, ApiError> {
        validate_page_id(page_id)?;
        self.store
            .load_identity(page_id)?
            .ok_or_else(|| ApiError::IdentityNotFound(page_id.to_string()))
    }

    pub fn view(&self, page_id: &str) -> Result<Page, ApiError> {
        validate_page_id(page_id)?;
        self.store
            .load_page(page_id)?
            .ok_or_else(|| ApiError::PageNotFound(page_id.to_string()))
    }

    pub fn list_pages(&self) -> Result<Vec<String>, ApiError> {
        Ok(self.store.list_pages()?)
    }

    /// Generate a complete page. A given identity is stored first and replaces
    /// the previous one; otherwise the stored identity is used.
    #[instrument(skip(self, identity, overrides))]
    pub async fn generate(
        &self,
        page_id: &str,
        identity: Option<BrandIdentity>,
        overrides: Option<&PageOverrides>,
    ) -> Result<Page, ApiError> {
        validate_page_id(page_id)?;
        let lock = self.lock_manager.get_lock(page_id);
        let _guard = lock.lock().await;

        let identity = match identity {
            Some(identity) => {
                identity
                    .validate()
                    .map_err(|e| ApiError::schema("identity", e))?;
                self.store.save_identity(page_id, &identity)?;
                identity
            }
            None => self
                .stored_identity(page_id)
                .ok_or_else(|| ApiError::IdentityNotFound(page_id.to_string()))?,
        };

        let page = self
            .orchestrator
            .generate_page_data(&identity, overrides)
            .await?;
        self.store.save_page(page_id, &page)?;
        Ok(page)
    }

    /// Editorial pass over the stored page.
    #[instrument(skip(self))]
    pub async fn edit(&self, page_id: &str) -> Result<EditOutcome, ApiError> {
        validate_page_id(page_id)?;
        let lock = self.lock_manager.get_lock(page_id);
        let _guard = lock.lock().await;

        let (page, identity) = self.load_for_update(page_id)?;
        let outcome = self.orchestrator.edit_page(&page, identity.as_ref()).await?;
        self.store.save_page(page_id, &outcome.page)?;
        Ok(outcome)
    }

    /// Score the stored page and record the verdicts; with
    /// `apply_recommendations`, failing sections are regenerated too.
    #[instrument(skip(self, thresholds))]
    pub async fn assess(
        &self,
        page_id: &str,
        thresholds: Option<QualityThresholds>,
        apply_recommendations: bool,
    ) -> Result<QualityOutcome, ApiError> {
        validate_page_id(page_id)?;
        let lock = self.lock_manager.get_lock(page_id);
        let _guard = lock.lock().await;

        let (page, identity) = self.load_for_update(page_id)?;
        let outcome = self
            .orchestrator
            .assess_quality(page, identity.as_ref(), thresholds, apply_recommendations)
            .await?;
        self.store.save_page(page_id, &outcome.page)?;
        Ok(outcome)
    }

    #[instrument(skip(self))]
    pub async fn regenerate_failed(&self, page_id: &str) -> Result<RegenerationSummary, ApiError> {
        validate_page_id(page_id)?;
        let lock = self.lock_manager.get_lock(page_id);
        let _guard = lock.lock().await;

        let (mut page, identity) = self.load_for_update(page_id)?;
        let summary = self
            .orchestrator
            .regenerate_failed_sections(&mut page, identity.as_ref())
            .await;
        self.store.save_page(page_id, &page)?;
        Ok(summary)
    }

    /// Regenerate the named sections, adding them to the page if absent.
    #[instrument(skip(self))]
    pub async fn regenerate_sections(
        &self,
        page_id: &str,
        kinds: &[SectionKind],
    ) -> Result<RegenerationSummary, ApiError> {
        validate_page_id(page_id)?;
        let lock = self.lock_manager.get_lock(page_id);
        let _guard = lock.lock().await;

        let (mut page, identity) = self.load_for_update(page_id)?;
        let summary = self
            .orchestrator
            .regenerate_sections(&mut page, identity.as_ref(), kinds)
            .await;
        self.store.save_page(page_id, &page)?;
        Ok(summary)
    }

    pub fn segments(&self) -> SegmentStore {
        self.segments.get_all_segments()
    }

    /// Clear one cached segment, or all of them.
    pub fn clear_segments(&self, kind: Option<SegmentKind>) {
        match kind {
            Some(kind) => self.segments.clear_segment(kind),
            None => self.segments.clear_all_segments(),
        }
        info!(segment = ?kind, "Cleared cached segments");
    }

    fn load_for_update(&self, page_id: &str) -> Result<(Page, Option<BrandIdentity>), ApiError> {
        let page = self
            .store
            .load_page(page_id)?
            .ok_or_else(|| ApiError::PageNotFound(page_id.to_string()))?;
        Ok((page, self.stored_identity(page_id)))
    }

    /// The page's stored identity. An unreadable identity document counts as absent.
    fn stored_identity(&self, page_id: &str) -> Option<BrandIdentity> {
        match self.store.load_identity(page_id) {
            Ok(identity) => identity,
            Err(e) => {
                warn!(page_id, error = %e, "Failed to load stored identity, continuing without it");
                None
            }
        }
    }
}

/// Build the generative backend for the configured provider.
pub fn backend_from_config(
    config: &PagecraftConfig,
) -> Result<Arc<dyn GenerativeBackend>, ApiError> {
    let (name, provider) = config.selected_provider()?;
    let mut provider = provider.clone();
    provider.provider_name.get_or_insert_with(|| name.to_string());

    let model_provider = provider.to_model_provider()?;
    let client: Arc<dyn ModelProviderClient> =
        Arc::from(ProviderFactory::create_client(&model_provider)?);
    info!(
        provider = name,
        model = client.model_name(),
        "Using generation provider"
    );
    Ok(Arc::new(ProviderBackend::new(
        client,
        config.completion_options(&provider),
    )))
}
