//! Page model
//!
//! A page is a set of top-level scalars (title, description, name, tagline),
//! an ordered `section_order`, and one optional slot per section kind.
//! Structural invariant: every kind listed in `section_order` has its slot
//! filled, and the required scalars are non-empty.

use crate::error::ApiError;
use crate::quality::SectionAssessment;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

pub mod kind;
pub mod merge;
pub mod sections;

pub use kind::SectionKind;
pub use merge::{merge_object, merge_section};
pub use sections::{
    AboutSection, ContactSection, CtaSection, FaqItem, FaqSection, FeatureItem, FeaturesSection,
    HeroSection, PricingPlan, PricingSection, SectionData, ServiceItem, ServicesSection, StatItem,
    StatsSection, TeamMember, TeamSection, Testimonial, TestimonialsSection,
};

/// Bookkeeping carried with a page but never sent to the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Sections currently holding fallback content.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub fallback_sections: BTreeSet<SectionKind>,
    /// Latest quality assessment per section.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub assessments: BTreeMap<SectionKind, SectionAssessment>,
}

impl PageMeta {
    pub fn is_empty(&self) -> bool {
        self.generated_at.is_none()
            && self.updated_at.is_none()
            && self.fallback_sections.is_empty()
            && self.assessments.is_empty()
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Page {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tagline: String,
    /// Rendering order of the sections.
    #[serde(default)]
    pub section_order: Vec<SectionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero: Option<HeroSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<AboutSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<ServicesSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<FeaturesSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<PricingSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testimonials: Option<TestimonialsSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faq: Option<FaqSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta: Option<CtaSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactSection>,
    #[serde(default, skip_serializing_if = "PageMeta::is_empty")]
    #[schemars(skip)]
    pub meta: PageMeta,
}

impl Page {
    /// Decode a page from JSON. Fails with a schema error if any present
    /// field has the wrong shape.
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        merge::expect_object("page", &value)?;
        serde_json::from_value(value).map_err(|e| ApiError::schema("page", e.to_string()))
    }

    /// JSON view of the page content, without bookkeeping.
    pub fn content_value(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or(Value::Null);
        if let Value::Object(map) = &mut value {
            map.remove("meta");
        }
        value
    }

    pub fn section(&self, kind: SectionKind) -> Option<SectionData> {
        match kind {
            SectionKind::Hero => self.hero.clone().map(SectionData::Hero),
            SectionKind::About => self.about.clone().map(SectionData::About),
            SectionKind::Services => self.services.clone().map(SectionData::Services),
            SectionKind::Features => self.features.clone().map(SectionData::Features),
            SectionKind::Pricing => self.pricing.clone().map(SectionData::Pricing),
            SectionKind::Testimonials => self.testimonials.clone().map(SectionData::Testimonials),
            SectionKind::Faq => self.faq.clone().map(SectionData::Faq),
            SectionKind::Team => self.team.clone().map(SectionData::Team),
            SectionKind::Stats => self.stats.clone().map(SectionData::Stats),
            SectionKind::Cta => self.cta.clone().map(SectionData::Cta),
            SectionKind::Contact => self.contact.clone().map(SectionData::Contact),
        }
    }

    pub fn has_section(&self, kind: SectionKind) -> bool {
        match kind {
            SectionKind::Hero => self.hero.is_some(),
            SectionKind::About => self.about.is_some(),
            SectionKind::Services => self.services.is_some(),
            SectionKind::Features => self.features.is_some(),
            SectionKind::Pricing => self.pricing.is_some(),
            SectionKind::Testimonials => self.testimonials.is_some(),
            SectionKind::Faq => self.faq.is_some(),
            SectionKind::Team => self.team.is_some(),
            SectionKind::Stats => self.stats.is_some(),
            SectionKind::Cta => self.cta.is_some(),
            SectionKind::Contact => self.contact.is_some(),
        }
    }

    /// Write section content into its slot, replacing what was there.
    pub fn set_section(&mut self, data: SectionData) {
        match data {
            SectionData::Hero(s) => self.hero = Some(s),
            SectionData::About(s) => self.about = Some(s),
            SectionData::Services(s) => self.services = Some(s),
            SectionData::Features(s) => self.features = Some(s),
            SectionData::Pricing(s) => self.pricing = Some(s),
            SectionData::Testimonials(s) => self.testimonials = Some(s),
            SectionData::Faq(s) => self.faq = Some(s),
            SectionData::Team(s) => self.team = Some(s),
            SectionData::Stats(s) => self.stats = Some(s),
            SectionData::Cta(s) => self.cta = Some(s),
            SectionData::Contact(s) => self.contact = Some(s),
        }
    }

    /// Kinds listed in `section_order` whose slot is empty.
    pub fn missing_sections(&self) -> Vec<SectionKind> {
        self.section_order
            .iter()
            .copied()
            .filter(|kind| !self.has_section(*kind))
            .collect()
    }

    /// Kinds that currently have content, in page order first, then the rest.
    pub fn present_sections(&self) -> Vec<SectionKind> {
        let mut kinds: Vec<SectionKind> = self
            .section_order
            .iter()
            .copied()
            .filter(|kind| self.has_section(*kind))
            .collect();
        for kind in SectionKind::ALL {
            if self.has_section(kind) && !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        kinds
    }

    pub fn is_fallback(&self, kind: SectionKind) -> bool {
        self.meta.fallback_sections.contains(&kind)
    }

    /// Check the structural invariant.
    pub fn validate_structure(&self) -> Result<(), ApiError> {
        let blank: Vec<&str> = [
            ("title", &self.title),
            ("description", &self.description),
            ("name", &self.name),
            ("tagline", &self.tagline),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| *field)
        .collect();
        if !blank.is_empty() {
            return Err(ApiError::schema(
                "page",
                format!("required fields are empty: {}", blank.join(", ")),
            ));
        }
        if self.section_order.is_empty() {
            return Err(ApiError::schema("page", "section_order must not be empty"));
        }
        let missing = self.missing_sections();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|k| k.as_str()).collect();
            return Err(ApiError::schema(
                "page",
                format!("sections listed in section_order are missing: {}", names.join(", ")),
            ));
        }
        Ok(())
    }
}
