//! Per-section generation outcomes.

use crate::error::ApiError;
use crate::page::{SectionData, SectionKind};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Retrying,
}

impl SectionStatus {
    /// `Pending -> InProgress -> {Completed | Failed}`, `Failed -> Retrying ->
    /// {Completed | Failed}`, and `Failed -> Completed` once fallback content
    /// is installed.
    pub fn can_transition_to(self, next: SectionStatus) -> bool {
        use SectionStatus::*;
        matches!(
            (self, next),
            (Pending, InProgress)
                | (InProgress, Completed)
                | (InProgress, Failed)
                | (Failed, Retrying)
                | (Failed, Completed)
                | (Retrying, Completed)
                | (Retrying, Failed)
        )
    }
}

/// Where the section content in a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentProvenance {
    Generated,
    Edited,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionGenerationResult {
    pub section: SectionKind,
    pub status: SectionStatus,
    /// Statuses this record passed through before `status`, oldest first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<SectionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SectionData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub retry_count: u32,
    pub duration_ms: u64,
    pub provenance: ContentProvenance,
}

impl SectionGenerationResult {
    pub fn pending(section: SectionKind) -> Self {
        Self {
            section,
            status: SectionStatus::Pending,
            history: Vec::new(),
            data: None,
            error: None,
            retry_count: 0,
            duration_ms: 0,
            provenance: ContentProvenance::Generated,
        }
    }

    /// A pending record moved to `InProgress`.
    pub fn started(section: SectionKind) -> Self {
        let mut result = Self::pending(section);
        result.transition(SectionStatus::InProgress);
        result
    }

    /// Record of a section the editorial pass rewrote.
    pub fn edited(section: SectionKind, data: SectionData) -> Self {
        let mut result = Self::started(section).complete(data, 0);
        result.provenance = ContentProvenance::Edited;
        result
    }

    pub fn transition(&mut self, next: SectionStatus) {
        if !self.status.can_transition_to(next) {
            warn!(
                section = %self.section,
                from = ?self.status,
                to = ?next,
                "Unexpected section status transition"
            );
        }
        self.history.push(self.status);
        self.status = next;
    }

    pub fn complete(mut self, data: SectionData, duration_ms: u64) -> Self {
        self.transition(SectionStatus::Completed);
        self.data = Some(data);
        self.error = None;
        self.duration_ms += duration_ms;
        self
    }

    pub fn fail(mut self, error: &ApiError, duration_ms: u64) -> Self {
        self.transition(SectionStatus::Failed);
        self.error = Some(error.to_string());
        self.duration_ms += duration_ms;
        self
    }

    /// Fold the outcome of a retry attempt into this record, which must be
    /// `Retrying`.
    pub fn absorb_retry(mut self, attempt: SectionGenerationResult) -> Self {
        self.transition(attempt.status);
        self.data = attempt.data;
        self.error = attempt.error;
        self.duration_ms += attempt.duration_ms;
        self.provenance = attempt.provenance;
        self
    }

    /// Terminal record for a section whose retries ran out. The last error is
    /// kept.
    pub fn into_fallback(mut self, data: SectionData) -> Self {
        self.transition(SectionStatus::Completed);
        self.data = Some(data);
        self.provenance = ContentProvenance::Fallback;
        self
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    /// Completed with content that did not come from the fallback provider.
    pub fn is_success(&self) -> bool {
        self.status == SectionStatus::Completed && self.provenance != ContentProvenance::Fallback
    }
}

/// A failed section attempt: the `Failed` result record plus the cause.
#[derive(Debug, Error)]
#[error("Section {} failed: {error}", .result.section)]
pub struct SectionFailure {
    pub result: SectionGenerationResult,
    #[source]
    pub error: ApiError,
}
