//! Section kinds: the closed set of named blocks a page can hold.

use crate::error::ApiError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Hero,
    About,
    Services,
    Features,
    Pricing,
    Testimonials,
    Faq,
    Team,
    Stats,
    Cta,
    Contact,
}

impl SectionKind {
    pub const ALL: [SectionKind; 11] = [
        SectionKind::Hero,
        SectionKind::About,
        SectionKind::Services,
        SectionKind::Features,
        SectionKind::Pricing,
        SectionKind::Testimonials,
        SectionKind::Faq,
        SectionKind::Team,
        SectionKind::Stats,
        SectionKind::Cta,
        SectionKind::Contact,
    ];

    /// Sections every page must carry.
    pub const REQUIRED: [SectionKind; 2] = [SectionKind::Hero, SectionKind::Services];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Hero => "hero",
            SectionKind::About => "about",
            SectionKind::Services => "services",
            SectionKind::Features => "features",
            SectionKind::Pricing => "pricing",
            SectionKind::Testimonials => "testimonials",
            SectionKind::Faq => "faq",
            SectionKind::Team => "team",
            SectionKind::Stats => "stats",
            SectionKind::Cta => "cta",
            SectionKind::Contact => "contact",
        }
    }

    /// Human-facing label, used in placeholders and prompts.
    pub fn label(self) -> &'static str {
        match self {
            SectionKind::Hero => "Hero",
            SectionKind::About => "About",
            SectionKind::Services => "Services",
            SectionKind::Features => "Features",
            SectionKind::Pricing => "Pricing",
            SectionKind::Testimonials => "Testimonials",
            SectionKind::Faq => "FAQ",
            SectionKind::Team => "Team",
            SectionKind::Stats => "Stats",
            SectionKind::Cta => "Call to Action",
            SectionKind::Contact => "Contact",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        let kind = match normalized.as_str() {
            "hero" => SectionKind::Hero,
            "about" => SectionKind::About,
            "services" => SectionKind::Services,
            "features" => SectionKind::Features,
            "pricing" => SectionKind::Pricing,
            "testimonials" => SectionKind::Testimonials,
            "faq" => SectionKind::Faq,
            "team" => SectionKind::Team,
            "stats" => SectionKind::Stats,
            "cta" | "call_to_action" => SectionKind::Cta,
            "contact" => SectionKind::Contact,
            _ => return Err(ApiError::UnknownSectionKind(s.to_string())),
        };
        Ok(kind)
    }
}
