//! Segment Cache
//!
//! Segments group related sections (see [`SegmentKind::sections`]) so that a
//! later run can reuse content produced for the same brand identity instead of
//! starting from nothing. The cache holds at most one segment per kind, keeps
//! an in-memory copy, and mirrors every write to durable storage.
//!
//! Storage failures never escape the cache: reads and clears log and report
//! absence, writes log and keep the in-memory update.

pub mod storage;

pub use storage::{FileSegmentStorage, SegmentStorage};

use crate::error::ApiError;
use crate::identity::BrandIdentity;
use crate::page::{Page, SectionKind};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentKind {
    Identity,
    ServiceOffering,
    Credibility,
    Conversion,
}

impl SegmentKind {
    pub const ALL: [SegmentKind; 4] = [
        SegmentKind::Identity,
        SegmentKind::ServiceOffering,
        SegmentKind::Credibility,
        SegmentKind::Conversion,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SegmentKind::Identity => "identity",
            SegmentKind::ServiceOffering => "service-offering",
            SegmentKind::Credibility => "credibility",
            SegmentKind::Conversion => "conversion",
        }
    }

    /// Sections grouped under this segment.
    pub fn sections(self) -> &'static [SectionKind] {
        match self {
            SegmentKind::Identity => &[SectionKind::Hero, SectionKind::About],
            SegmentKind::ServiceOffering => &[
                SectionKind::Services,
                SectionKind::Features,
                SectionKind::Pricing,
            ],
            SegmentKind::Credibility => &[
                SectionKind::Testimonials,
                SectionKind::Team,
                SectionKind::Stats,
            ],
            SegmentKind::Conversion => &[SectionKind::Faq, SectionKind::Cta, SectionKind::Contact],
        }
    }

    /// The segment a section belongs to.
    pub fn for_section(kind: SectionKind) -> SegmentKind {
        match kind {
            SectionKind::Hero | SectionKind::About => SegmentKind::Identity,
            SectionKind::Services | SectionKind::Features | SectionKind::Pricing => {
                SegmentKind::ServiceOffering
            }
            SectionKind::Testimonials | SectionKind::Team | SectionKind::Stats => {
                SegmentKind::Credibility
            }
            SectionKind::Faq | SectionKind::Cta | SectionKind::Contact => SegmentKind::Conversion,
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SegmentKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        SegmentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ApiError::UnknownSegmentKind(s.to_string()))
    }
}

/// Cached content for one segment kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Section name -> section JSON, limited to the kind's sections.
    pub content: Map<String, Value>,
    /// Fingerprint of the identity the content was produced for.
    #[serde(default)]
    pub identity_fingerprint: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Segment {
    /// Capture the sections of `page` belonging to `kind`. Fallback sections
    /// are not worth reusing and are left out. Returns `None` when nothing
    /// real is left.
    pub fn from_page(kind: SegmentKind, page: &Page, fingerprint: Option<String>) -> Option<Self> {
        let content: Map<String, Value> = kind
            .sections()
            .iter()
            .filter(|section| !page.is_fallback(**section))
            .filter_map(|section| {
                page.section(*section)
                    .map(|data| (section.as_str().to_string(), data.to_value()))
            })
            .collect();
        if content.is_empty() {
            return None;
        }
        Some(Self {
            kind,
            content,
            identity_fingerprint: fingerprint,
            updated_at: Utc::now(),
        })
    }

    /// Cached JSON for one section of this segment.
    pub fn section(&self, kind: SectionKind) -> Option<&Value> {
        self.content.get(kind.as_str())
    }

    pub fn matches_identity(&self, fingerprint: &str) -> bool {
        self.identity_fingerprint.as_deref() == Some(fingerprint)
    }
}

pub type SegmentStore = BTreeMap<SegmentKind, Segment>;

/// Derive every non-empty segment of `page`, tagged with the identity's fingerprint.
pub fn segments_for(page: &Page, identity: Option<&BrandIdentity>) -> Vec<Segment> {
    let fingerprint = identity.map(BrandIdentity::fingerprint);
    SegmentKind::ALL
        .into_iter()
        .filter_map(|kind| Segment::from_page(kind, page, fingerprint.clone()))
        .collect()
}

pub struct SegmentCache {
    segments: Mutex<SegmentStore>,
    storage: Arc<dyn SegmentStorage>,
}

impl SegmentCache {
    /// Create a cache backed by `storage`, loading whatever it already holds.
    pub fn new(storage: Arc<dyn SegmentStorage>) -> Self {
        let segments = match storage.load_all() {
            Ok(segments) => {
                debug!(count = segments.len(), "Loaded cached segments");
                segments
            }
            Err(e) => {
                warn!(error = %e, "Failed to load cached segments, starting empty");
                SegmentStore::new()
            }
        };
        Self {
            segments: Mutex::new(segments),
            storage,
        }
    }

    /// Store `segment` under `kind`, replacing any previous entry.
    pub fn save_segment(&self, kind: SegmentKind, mut segment: Segment) {
        segment.kind = kind;
        let mut segments = self.segments.lock();
        if let Err(e) = self.storage.save(&segment) {
            warn!(segment = %kind, error = %e, "Failed to persist segment, keeping in memory");
        }
        segments.insert(kind, segment);
    }

    /// Parse `name` and store the segment under it.
    pub fn save_named(&self, name: &str, segment: Segment) -> Result<(), ApiError> {
        let kind: SegmentKind = name.parse()?;
        self.save_segment(kind, segment);
        Ok(())
    }

    pub fn get_segment(&self, kind: SegmentKind) -> Option<Segment> {
        self.segments.lock().get(&kind).cloned()
    }

    pub fn has_segment(&self, kind: SegmentKind) -> bool {
        self.segments.lock().contains_key(&kind)
    }

    /// Snapshot of every cached segment.
    pub fn get_all_segments(&self) -> SegmentStore {
        self.segments.lock().clone()
    }

    /// Cached segment for `kind`, only if produced for the same identity.
    pub fn fresh_segment(&self, kind: SegmentKind, fingerprint: &str) -> Option<Segment> {
        self.get_segment(kind)
            .filter(|segment| segment.matches_identity(fingerprint))
    }

    pub fn clear_segment(&self, kind: SegmentKind) {
        let mut segments = self.segments.lock();
        if let Err(e) = self.storage.delete(kind) {
            warn!(segment = %kind, error = %e, "Failed to delete stored segment");
        }
        segments.remove(&kind);
    }

    pub fn clear_all_segments(&self) {
        let mut segments = self.segments.lock();
        for kind in SegmentKind::ALL {
            if let Err(e) = self.storage.delete(kind) {
                warn!(segment = %kind, error = %e, "Failed to delete stored segment");
            }
        }
        segments.clear();
    }

    /// Save every segment derived from `page`.
    pub fn capture_page(&self, page: &Page, identity: Option<&BrandIdentity>) -> usize {
        let segments = segments_for(page, identity);
        let count = segments.len();
        for segment in segments {
            self.save_segment(segment.kind, segment);
        }
        debug!(count, "Captured page segments");
        count
    }
}
