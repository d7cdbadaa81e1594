//! Section Generator
//!
//! Generates one section of a page against its schema. A single call makes a
//! single attempt; retry and fallback decisions belong to the caller.

use super::result::{SectionFailure, SectionGenerationResult};
use crate::error::ApiError;
use crate::identity::BrandIdentity;
use crate::page::{merge_section, Page, SectionData, SectionKind};
use crate::prompt::{PromptSet, PromptTemplate, PromptVars};
use crate::provider::GenerativeBackend;
use crate::schema::OutputSchema;
use crate::segment::{SegmentCache, SegmentKind};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionOptions {
    /// Retry budget of the calling workflow; rendered into logs only.
    pub max_retries: u32,
    pub simplify_prompt: bool,
    pub is_retry: bool,
}

impl Default for SectionOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            simplify_prompt: false,
            is_retry: false,
        }
    }
}

pub struct SectionGenerator {
    backend: Arc<dyn GenerativeBackend>,
    prompts: Arc<PromptSet>,
    segments: Option<Arc<SegmentCache>>,
}

impl SectionGenerator {
    pub fn new(backend: Arc<dyn GenerativeBackend>, prompts: Arc<PromptSet>) -> Self {
        Self {
            backend,
            prompts,
            segments: None,
        }
    }

    /// Offer cached segment content for the same identity as prompt context.
    pub fn with_segment_cache(mut self, segments: Arc<SegmentCache>) -> Self {
        self.segments = Some(segments);
        self
    }

    /// Generate `kind` with the default section template and the kind's full schema.
    pub async fn generate(
        &self,
        page: &mut Page,
        kind: SectionKind,
        identity: Option<&BrandIdentity>,
        options: &SectionOptions,
    ) -> Result<SectionGenerationResult, SectionFailure> {
        let schema = OutputSchema::for_section(kind);
        self.generate_section(page, kind, &self.prompts.section, &schema, identity, options)
            .await
    }

    /// One attempt at `kind`. On success the merged section is written into
    /// `page`, its fallback marker and stale assessment are cleared, and the
    /// kind is appended to `section_order` if absent.
    pub async fn generate_section(
        &self,
        page: &mut Page,
        kind: SectionKind,
        template: &PromptTemplate,
        schema: &OutputSchema,
        identity: Option<&BrandIdentity>,
        options: &SectionOptions,
    ) -> Result<SectionGenerationResult, SectionFailure> {
        let started = Instant::now();
        let result = SectionGenerationResult::started(kind);
        debug!(
            section = %kind,
            is_retry = options.is_retry,
            simplify = options.simplify_prompt,
            "Generating section"
        );

        match self
            .attempt(page, kind, template, schema, identity, options)
            .await
        {
            Ok(data) => {
                page.set_section(data.clone());
                page.meta.fallback_sections.remove(&kind);
                page.meta.assessments.remove(&kind);
                if !page.section_order.contains(&kind) {
                    page.section_order.push(kind);
                }
                page.meta.touch();
                let duration_ms = started.elapsed().as_millis() as u64;
                debug!(section = %kind, duration_ms, "Section generated");
                Ok(result.complete(data, duration_ms))
            }
            Err(error) => {
                let duration_ms = started.elapsed().as_millis() as u64;
                warn!(
                    section = %kind,
                    is_retry = options.is_retry,
                    max_retries = options.max_retries,
                    error = %error,
                    "Section generation failed"
                );
                Err(SectionFailure {
                    result: result.fail(&error, duration_ms),
                    error,
                })
            }
        }
    }

    async fn attempt(
        &self,
        page: &Page,
        kind: SectionKind,
        template: &PromptTemplate,
        schema: &OutputSchema,
        identity: Option<&BrandIdentity>,
        options: &SectionOptions,
    ) -> Result<SectionData, ApiError> {
        let prompt = self.render_prompt(page, kind, template, identity, options);
        let value = self.backend.invoke(&prompt, schema).await?;
        schema.check(&value)?;

        // Fallback content is a placeholder, never a base to merge over.
        let existing = if page.is_fallback(kind) {
            None
        } else {
            page.section(kind)
        };
        merge_section(kind, existing.as_ref(), &value)
    }

    pub fn render_prompt(
        &self,
        page: &Page,
        kind: SectionKind,
        template: &PromptTemplate,
        identity: Option<&BrandIdentity>,
        options: &SectionOptions,
    ) -> String {
        let section_order: Vec<&str> = page.section_order.iter().map(|k| k.as_str()).collect();
        let current_section = match page.section(kind) {
            Some(data) if !page.is_fallback(kind) => {
                serde_json::to_string_pretty(&data).unwrap_or_default()
            }
            _ => "none".to_string(),
        };

        let vars = PromptVars::new()
            .set("page_title", page.title.as_str())
            .set("page_description", page.description.as_str())
            .set("page_name", page.name.as_str())
            .set("page_tagline", page.tagline.as_str())
            .set("section_order", section_order.join(", "))
            .set("current_section", current_section)
            .set("section_kind", kind.as_str())
            .set("is_retry", options.is_retry.to_string())
            .set(
                "brand_guidelines",
                identity.map(BrandIdentity::brand_guidelines).unwrap_or_default(),
            )
            .set("cached_context", self.cached_context(kind, identity));

        let mut prompt = template.render(&vars);
        if options.is_retry {
            prompt.push_str("\n\n");
            prompt.push_str(&self.prompts.retry_instruction);
        }
        if options.simplify_prompt {
            prompt.push_str("\n\n");
            prompt.push_str(&self.prompts.simplify_instruction);
        }
        prompt
    }

    fn cached_context(&self, kind: SectionKind, identity: Option<&BrandIdentity>) -> String {
        let (Some(segments), Some(identity)) = (&self.segments, identity) else {
            return String::new();
        };
        let fingerprint = identity.fingerprint();
        segments
            .fresh_segment(SegmentKind::for_section(kind), &fingerprint)
            .and_then(|segment| segment.section(kind).cloned())
            .map(|cached| {
                format!(
                    "Previously approved content for this section (reuse what still fits):\n{}",
                    serde_json::to_string_pretty(&cached).unwrap_or_default()
                )
            })
            .unwrap_or_default()
    }
}
