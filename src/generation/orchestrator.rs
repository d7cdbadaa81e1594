//! Page Generation Orchestrator
//!
//! Owns the whole-page workflows: two-phase generation, the editorial pass
//! over an existing page, quality assessment, and section recovery. Backend
//! calls are made one at a time; each prompt may depend on earlier output.

use super::defaults::{
    backfill_scalars, enforce_section_order, finalize_page, sanitize_page_value, PageOverrides,
};
use super::phase::PipelinePhase;
use super::result::SectionGenerationResult;
use super::section::SectionGenerator;
use crate::error::ApiError;
use crate::identity::BrandIdentity;
use crate::page::{Page, SectionKind};
use crate::prompt::{PromptSet, PromptVars};
use crate::provider::GenerativeBackend;
use crate::quality::{failing_sections, QualityThresholds, SectionAssessment, SectionScore};
use crate::regeneration::{self, RegenerationSummary, RetryPolicy};
use crate::schema::OutputSchema;
use crate::segment::{SegmentCache, SegmentKind};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Knobs for the generation workflows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub max_retries: u32,
    pub simplify_on_retry: bool,
    /// Read cached segments into prompts and capture new ones after each run.
    pub reuse_segments: bool,
    pub thresholds: QualityThresholds,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            simplify_on_retry: true,
            reuse_segments: true,
            thresholds: QualityThresholds::default(),
        }
    }
}

impl GenerationSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            simplify_on_retry: self.simplify_on_retry,
        }
    }
}

/// Result of a quality assessment run.
#[derive(Debug, Clone, Serialize)]
pub struct QualityOutcome {
    pub assessments: BTreeMap<SectionKind, SectionAssessment>,
    /// Sections that failed the thresholds, in page order.
    pub failing: Vec<SectionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regeneration: Option<RegenerationSummary>,
    /// False iff a section of the page is left on fallback content.
    pub success: bool,
    pub page: Page,
}

/// Result of an editorial pass.
#[derive(Debug, Clone, Serialize)]
pub struct EditOutcome {
    pub page: Page,
    /// One `Edited` record per section whose content the pass changed.
    pub sections: BTreeMap<SectionKind, SectionGenerationResult>,
}

pub struct PageOrchestrator {
    backend: Arc<dyn GenerativeBackend>,
    prompts: Arc<PromptSet>,
    segments: Option<Arc<SegmentCache>>,
    sections: SectionGenerator,
    settings: GenerationSettings,
}

impl PageOrchestrator {
    pub fn new(
        backend: Arc<dyn GenerativeBackend>,
        prompts: Arc<PromptSet>,
        settings: GenerationSettings,
    ) -> Self {
        let sections = SectionGenerator::new(backend.clone(), prompts.clone());
        Self {
            backend,
            prompts,
            segments: None,
            sections,
            settings,
        }
    }

    /// Attach the segment cache. Ignored when segment reuse is disabled.
    pub fn with_segment_cache(mut self, cache: Arc<SegmentCache>) -> Self {
        if self.settings.reuse_segments {
            self.sections = SectionGenerator::new(self.backend.clone(), self.prompts.clone())
                .with_segment_cache(cache.clone());
            self.segments = Some(cache);
        }
        self
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn section_generator(&self) -> &SectionGenerator {
        &self.sections
    }

    /// Draft, review, finalize. Only a failed draft is an error.
    pub async fn generate_page_data(
        &self,
        identity: &BrandIdentity,
        overrides: Option<&PageOverrides>,
    ) -> Result<Page, ApiError> {
        let mut phase = PipelinePhase::Drafting;
        loop {
            debug!(phase = phase.name(), brand = %identity.name, "Page pipeline phase");
            phase = match phase {
                PipelinePhase::Drafting => {
                    let draft = self.draft(identity).await?;
                    PipelinePhase::Reviewing { draft }
                }
                PipelinePhase::Reviewing { draft } => {
                    let winner = match self.review(&draft, identity).await {
                        Ok(reviewed) => reviewed,
                        Err(e) => {
                            warn!(error = %e, "Editorial review failed, keeping the draft");
                            draft
                        }
                    };
                    let page = finalize_page(winner, identity, overrides)?;
                    PipelinePhase::Finalized(Box::new(page))
                }
                PipelinePhase::Finalized(page) => {
                    let page = *page;
                    self.capture_segments(&page, Some(identity));
                    info!(
                        sections = page.section_order.len(),
                        fallbacks = page.meta.fallback_sections.len(),
                        "Page generated"
                    );
                    return Ok(page);
                }
            };
        }
    }

    async fn draft(&self, identity: &BrandIdentity) -> Result<Map<String, Value>, ApiError> {
        let vars = PromptVars::new()
            .set("brand_guidelines", identity.brand_guidelines())
            .set("cached_context", self.page_cached_context(identity));
        let prompt = self.prompts.generation.render(&vars);
        let value = self.backend.invoke(&prompt, &OutputSchema::for_page()).await?;
        sanitize_page_value(&value)
    }

    async fn review(
        &self,
        draft: &Map<String, Value>,
        identity: &BrandIdentity,
    ) -> Result<Map<String, Value>, ApiError> {
        let draft_json = serde_json::to_string_pretty(draft)
            .map_err(|e| ApiError::GenerationFailed(format!("Failed to encode draft: {}", e)))?;
        let vars = PromptVars::new()
            .set("brand_guidelines", identity.brand_guidelines())
            .set("draft", draft_json);
        let prompt = self.prompts.review.render(&vars);
        let value = self.backend.invoke(&prompt, &OutputSchema::for_page()).await?;
        let reviewed = sanitize_page_value(&value)?;
        // Scalars of the wrong type would make the reviewed page undecodable.
        Page::from_value(Value::Object(reviewed.clone()))?;
        Ok(reviewed)
    }

    /// Editorial pass over an existing page. The result keeps the input's
    /// bookkeeping; anything the backend dropped is taken from the input.
    pub async fn edit_page(
        &self,
        page: &Page,
        identity: Option<&BrandIdentity>,
    ) -> Result<EditOutcome, ApiError> {
        let page_json = serde_json::to_string_pretty(&page.content_value())
            .map_err(|e| ApiError::GenerationFailed(format!("Failed to encode page: {}", e)))?;
        let vars = PromptVars::new()
            .set(
                "brand_guidelines",
                identity.map(BrandIdentity::brand_guidelines).unwrap_or_default(),
            )
            .set("page", page_json);
        let prompt = self.prompts.edit.render(&vars);
        let value = self.backend.invoke(&prompt, &OutputSchema::for_page()).await?;
        let mut edited = Page::from_value(Value::Object(sanitize_page_value(&value)?))?;

        edited.meta = page.meta.clone();
        if edited.section_order.is_empty() {
            edited.section_order = page.section_order.clone();
        }
        for (slot, original) in [
            (&mut edited.title, &page.title),
            (&mut edited.description, &page.description),
            (&mut edited.name, &page.name),
            (&mut edited.tagline, &page.tagline),
        ] {
            if slot.trim().is_empty() {
                *slot = original.clone();
            }
        }
        backfill_scalars(&mut edited, identity);

        let mut sections = BTreeMap::new();
        for kind in SectionKind::ALL {
            match (edited.section(kind), page.section(kind)) {
                (None, Some(original)) => edited.set_section(original),
                (Some(new), original) if original.as_ref() != Some(&new) => {
                    edited.meta.assessments.remove(&kind);
                    edited.meta.fallback_sections.remove(&kind);
                    sections.insert(kind, SectionGenerationResult::edited(kind, new));
                }
                _ => {}
            }
        }
        enforce_section_order(&mut edited);
        edited.validate_structure()?;
        edited.meta.touch();
        info!(
            sections = edited.section_order.len(),
            changed = sections.len(),
            "Page edited"
        );
        Ok(EditOutcome {
            page: edited,
            sections,
        })
    }

    /// Score every section, apply thresholds, record the verdicts in the page,
    /// and optionally regenerate the sections that failed.
    pub async fn assess_quality(
        &self,
        mut page: Page,
        identity: Option<&BrandIdentity>,
        thresholds: Option<QualityThresholds>,
        apply_recommendations: bool,
    ) -> Result<QualityOutcome, ApiError> {
        let thresholds = thresholds.unwrap_or(self.settings.thresholds);
        let report = self.score(&page, identity).await?;
        let assessments = thresholds.evaluate_report(&page, &report);
        page.meta
            .assessments
            .extend(assessments.iter().map(|(kind, a)| (*kind, a.clone())));
        page.meta.touch();

        let failing = failing_sections(&page, &assessments);
        info!(
            assessed = assessments.len(),
            failing = failing.len(),
            "Quality assessment finished"
        );

        let regeneration = if apply_recommendations && !failing.is_empty() {
            Some(self.regenerate_sections(&mut page, identity, &failing).await)
        } else {
            None
        };

        let success = !page
            .section_order
            .iter()
            .any(|kind| page.is_fallback(*kind));
        Ok(QualityOutcome {
            assessments,
            failing,
            regeneration,
            success,
            page,
        })
    }

    async fn score(
        &self,
        page: &Page,
        identity: Option<&BrandIdentity>,
    ) -> Result<crate::quality::QualityReport, ApiError> {
        let section_list: Vec<&str> = page
            .present_sections()
            .iter()
            .map(|kind| kind.as_str())
            .collect();
        let page_json = serde_json::to_string_pretty(&page.content_value())
            .map_err(|e| ApiError::GenerationFailed(format!("Failed to encode page: {}", e)))?;
        let vars = PromptVars::new()
            .set(
                "brand_guidelines",
                identity.map(BrandIdentity::brand_guidelines).unwrap_or_default(),
            )
            .set("section_list", section_list.join(", "))
            .set("page", page_json);
        let prompt = self.prompts.assess.render(&vars);
        let value = self
            .backend
            .invoke(&prompt, &OutputSchema::for_quality_report())
            .await?;
        parse_quality_report(&value)
    }

    /// Regenerate every section that is missing, on fallback content, or
    /// failed its latest assessment.
    pub async fn regenerate_failed_sections(
        &self,
        page: &mut Page,
        identity: Option<&BrandIdentity>,
    ) -> RegenerationSummary {
        let kinds = regeneration::sections_needing_regeneration(page);
        self.regenerate_sections(page, identity, &kinds).await
    }

    /// Regenerate an explicit list of sections with the same retry/fallback rules.
    pub async fn regenerate_sections(
        &self,
        page: &mut Page,
        identity: Option<&BrandIdentity>,
        kinds: &[SectionKind],
    ) -> RegenerationSummary {
        let summary = regeneration::regenerate_sections(
            &self.sections,
            page,
            kinds,
            identity,
            self.settings.retry_policy(),
        )
        .await;
        if !summary.succeeded.is_empty() {
            self.capture_segments(page, identity);
        }
        summary
    }

    fn page_cached_context(&self, identity: &BrandIdentity) -> String {
        let Some(cache) = &self.segments else {
            return String::new();
        };
        let fingerprint = identity.fingerprint();
        let mut cached = Map::new();
        for kind in SegmentKind::ALL {
            if let Some(segment) = cache.fresh_segment(kind, &fingerprint) {
                cached.extend(segment.content);
            }
        }
        if cached.is_empty() {
            return String::new();
        }
        debug!(sections = cached.len(), "Offering cached sections to the draft");
        format!(
            "Previously approved sections for this brand (reuse what still fits):\n{}",
            serde_json::to_string_pretty(&cached).unwrap_or_default()
        )
    }

    fn capture_segments(&self, page: &Page, identity: Option<&BrandIdentity>) {
        if let Some(cache) = &self.segments {
            cache.capture_page(page, identity);
        }
    }
}

/// Decode a scoring reply entry by entry. Entries naming an unknown section or
/// missing scores are skipped with a warning.
fn parse_quality_report(value: &Value) -> Result<crate::quality::QualityReport, ApiError> {
    let entries = value
        .get("sections")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::schema("quality_report", "missing sections list"))?;

    let mut sections = Vec::with_capacity(entries.len());
    for entry in entries {
        match serde_json::from_value::<SectionScore>(entry.clone()) {
            Ok(score) => sections.push(score),
            Err(e) => warn!(entry = %entry, error = %e, "Skipping unusable section score"),
        }
    }
    Ok(crate::quality::QualityReport { sections })
}
