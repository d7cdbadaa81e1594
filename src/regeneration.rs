//! Failed-section Regeneration
//!
//! Regenerates the sections of a page that are missing, hold fallback content,
//! or failed their latest quality assessment. Each section gets a bounded
//! number of retry attempts; a section that never succeeds is replaced with
//! disabled fallback content, so the page always leaves this module
//! structurally complete.

use crate::fallback::fallback_content;
use crate::generation::defaults::install_fallback;
use crate::generation::result::{SectionGenerationResult, SectionStatus};
use crate::generation::section::{SectionGenerator, SectionOptions};
use crate::identity::BrandIdentity;
use crate::page::{Page, SectionKind};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Retry policy applied to each regenerated section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per section; at least one attempt is always made.
    pub max_retries: u32,
    /// Ask for shorter content from the second attempt on.
    pub simplify_on_retry: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            simplify_on_retry: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegenerationSummary {
    /// False iff at least one section ended on fallback content.
    pub success: bool,
    pub message: String,
    pub succeeded: Vec<SectionKind>,
    pub failed: Vec<SectionKind>,
    pub sections: BTreeMap<SectionKind, SectionGenerationResult>,
}

impl RegenerationSummary {
    pub fn nothing_to_do() -> Self {
        Self {
            success: true,
            message: "No sections needed regeneration".to_string(),
            succeeded: Vec::new(),
            failed: Vec::new(),
            sections: BTreeMap::new(),
        }
    }

    fn from_results(results: Vec<SectionGenerationResult>) -> Self {
        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        let mut sections = BTreeMap::new();
        for result in results {
            if result.is_success() {
                succeeded.push(result.section);
            } else {
                failed.push(result.section);
            }
            sections.insert(result.section, result);
        }

        let total = succeeded.len() + failed.len();
        let message = if failed.is_empty() {
            format!("Regenerated {} of {} sections", succeeded.len(), total)
        } else {
            let names: Vec<&str> = failed.iter().map(|k| k.as_str()).collect();
            format!(
                "Regenerated {} of {} sections; fallback content used for: {}",
                succeeded.len(),
                total,
                names.join(", ")
            )
        };

        Self {
            success: failed.is_empty(),
            message,
            succeeded,
            failed,
            sections,
        }
    }
}

/// Sections in `section_order` that are missing, on fallback content, or
/// whose latest assessment failed.
pub fn sections_needing_regeneration(page: &Page) -> Vec<SectionKind> {
    page.section_order
        .iter()
        .copied()
        .filter(|kind| {
            !page.has_section(*kind)
                || page.is_fallback(*kind)
                || page
                    .meta
                    .assessments
                    .get(kind)
                    .is_some_and(|assessment| !assessment.passed)
        })
        .collect()
}

/// Run the retry/fallback loop over `kinds`, one section at a time.
pub async fn regenerate_sections(
    generator: &SectionGenerator,
    page: &mut Page,
    kinds: &[SectionKind],
    identity: Option<&BrandIdentity>,
    policy: RetryPolicy,
) -> RegenerationSummary {
    if kinds.is_empty() {
        return RegenerationSummary::nothing_to_do();
    }

    let attempts = policy.max_retries.max(1);
    let mut results = Vec::with_capacity(kinds.len());

    for &kind in kinds {
        // One record per section across attempts: `Failed -> Retrying` before
        // each attempt after the first.
        let mut record: Option<SectionGenerationResult> = None;

        for attempt in 1..=attempts {
            if let Some(record) = record.as_mut() {
                record.transition(SectionStatus::Retrying);
            }
            let options = SectionOptions {
                max_retries: attempts,
                simplify_prompt: policy.simplify_on_retry && attempt > 1,
                is_retry: true,
            };
            let outcome = match generator.generate(page, kind, identity, &options).await {
                Ok(result) => result,
                Err(failure) => failure.result,
            };
            let merged = match record.take() {
                Some(previous) => previous.absorb_retry(outcome),
                None => outcome,
            };
            let done = merged.is_success();
            record = Some(merged.with_retry_count(attempt - 1));
            if done {
                break;
            }
        }

        let record = record.unwrap_or_else(|| SectionGenerationResult::started(kind));
        let result = if record.is_success() {
            record
        } else {
            warn!(
                section = %kind,
                attempts,
                "Retries exhausted, using fallback content"
            );
            install_fallback(page, kind);
            page.meta.touch();
            record
                .into_fallback(fallback_content(kind))
                .with_retry_count(attempts)
        };
        results.push(result);
    }

    let summary = RegenerationSummary::from_results(results);
    info!(
        succeeded = summary.succeeded.len(),
        failed = summary.failed.len(),
        "Section regeneration finished"
    );
    summary
}
