//! Quality Assessment
//!
//! Scoring of sections is backend-driven and non-deterministic. Turning a score
//! into pass/fail is not: thresholds are applied here, and the set of failing
//! sections is exactly what the regeneration workflow consumes.

use crate::page::{Page, SectionKind};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Minimum scores a section needs to pass. All scores live in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    #[serde(default = "default_min_combined")]
    pub min_combined: f64,
    #[serde(default = "default_min_quality")]
    pub min_quality: f64,
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

fn default_min_combined() -> f64 {
    0.70
}

fn default_min_quality() -> f64 {
    0.60
}

fn default_min_confidence() -> f64 {
    0.50
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_combined: default_min_combined(),
            min_quality: default_min_quality(),
            min_confidence: default_min_confidence(),
        }
    }
}

impl QualityThresholds {
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("min_combined", self.min_combined),
            ("min_quality", self.min_quality),
            ("min_confidence", self.min_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be within 0.0..=1.0, got {}", name, value));
            }
        }
        Ok(())
    }

    /// Deterministic pass/fail for one scored section.
    pub fn evaluate(&self, score: &SectionScore) -> SectionAssessment {
        let quality = normalize(score.quality_score);
        let confidence = normalize(score.confidence_score);
        let (combined, passed) = match (quality, confidence) {
            (Some(q), Some(c)) => {
                let combined = (q + c) / 2.0;
                let passed = combined >= self.min_combined
                    && q >= self.min_quality
                    && c >= self.min_confidence;
                (combined, passed)
            }
            _ => (0.0, false),
        };
        SectionAssessment {
            section: score.section,
            quality_score: quality.unwrap_or(0.0),
            confidence_score: confidence.unwrap_or(0.0),
            combined_score: combined,
            passed,
            rationale: score.rationale.clone(),
            recommendations: score.recommendations.clone(),
            assessed_at: Utc::now(),
        }
    }

    /// Evaluate a full backend report. Scores for sections the page does not
    /// carry are ignored; a repeated section keeps its last score.
    pub fn evaluate_report(
        &self,
        page: &Page,
        report: &QualityReport,
    ) -> BTreeMap<SectionKind, SectionAssessment> {
        report
            .sections
            .iter()
            .filter(|score| page.has_section(score.section))
            .map(|score| (score.section, self.evaluate(score)))
            .collect()
    }
}

/// Scores must be finite; out-of-range values are clamped.
fn normalize(score: f64) -> Option<f64> {
    if score.is_finite() {
        Some(score.clamp(0.0, 1.0))
    } else {
        None
    }
}

/// One section's scores as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SectionScore {
    pub section: SectionKind,
    pub quality_score: f64,
    pub confidence_score: f64,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Backend scoring response for a whole page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QualityReport {
    pub sections: Vec<SectionScore>,
}

/// Thresholded verdict for one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionAssessment {
    pub section: SectionKind,
    pub quality_score: f64,
    pub confidence_score: f64,
    pub combined_score: f64,
    pub passed: bool,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub assessed_at: DateTime<Utc>,
}

/// Sections of `page` whose latest assessment failed, in rendering order.
/// Sections that were never assessed do not count as failing.
pub fn failing_sections(
    page: &Page,
    assessments: &BTreeMap<SectionKind, SectionAssessment>,
) -> Vec<SectionKind> {
    page.section_order
        .iter()
        .copied()
        .filter(|kind| assessments.get(kind).is_some_and(|a| !a.passed))
        .collect()
}
