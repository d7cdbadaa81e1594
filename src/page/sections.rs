//! Typed section content. Each struct is the schema for its section kind.

use super::kind::SectionKind;
use crate::error::ApiError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HeroSection {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub cta_text: String,
    #[serde(default)]
    pub cta_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_alt: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AboutSection {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ServiceItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ServicesSection {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub items: Vec<ServiceItem>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FeatureItem {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FeaturesSection {
    pub title: String,
    #[serde(default)]
    pub items: Vec<FeatureItem>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PricingPlan {
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub highlighted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PricingSection {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub plans: Vec<PricingPlan>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Testimonial {
    pub quote: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TestimonialsSection {
    pub title: String,
    #[serde(default)]
    pub items: Vec<Testimonial>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FaqSection {
    pub title: String,
    #[serde(default)]
    pub items: Vec<FaqItem>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TeamMember {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TeamSection {
    pub title: String,
    #[serde(default)]
    pub members: Vec<TeamMember>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StatItem {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StatsSection {
    pub title: String,
    #[serde(default)]
    pub items: Vec<StatItem>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CtaSection {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub button_text: String,
    #[serde(default)]
    pub button_link: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContactSection {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub form_enabled: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Content of one section, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionData {
    Hero(HeroSection),
    About(AboutSection),
    Services(ServicesSection),
    Features(FeaturesSection),
    Pricing(PricingSection),
    Testimonials(TestimonialsSection),
    Faq(FaqSection),
    Team(TeamSection),
    Stats(StatsSection),
    Cta(CtaSection),
    Contact(ContactSection),
}

fn decode<T: serde::de::DeserializeOwned>(kind: SectionKind, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::schema(kind.as_str(), e.to_string()))
}

impl SectionData {
    pub fn kind(&self) -> SectionKind {
        match self {
            SectionData::Hero(_) => SectionKind::Hero,
            SectionData::About(_) => SectionKind::About,
            SectionData::Services(_) => SectionKind::Services,
            SectionData::Features(_) => SectionKind::Features,
            SectionData::Pricing(_) => SectionKind::Pricing,
            SectionData::Testimonials(_) => SectionKind::Testimonials,
            SectionData::Faq(_) => SectionKind::Faq,
            SectionData::Team(_) => SectionKind::Team,
            SectionData::Stats(_) => SectionKind::Stats,
            SectionData::Cta(_) => SectionKind::Cta,
            SectionData::Contact(_) => SectionKind::Contact,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            SectionData::Hero(s) => &s.title,
            SectionData::About(s) => &s.title,
            SectionData::Services(s) => &s.title,
            SectionData::Features(s) => &s.title,
            SectionData::Pricing(s) => &s.title,
            SectionData::Testimonials(s) => &s.title,
            SectionData::Faq(s) => &s.title,
            SectionData::Team(s) => &s.title,
            SectionData::Stats(s) => &s.title,
            SectionData::Cta(s) => &s.title,
            SectionData::Contact(s) => &s.title,
        }
    }

    pub fn enabled(&self) -> bool {
        match self {
            SectionData::Hero(s) => s.enabled,
            SectionData::About(s) => s.enabled,
            SectionData::Services(s) => s.enabled,
            SectionData::Features(s) => s.enabled,
            SectionData::Pricing(s) => s.enabled,
            SectionData::Testimonials(s) => s.enabled,
            SectionData::Faq(s) => s.enabled,
            SectionData::Team(s) => s.enabled,
            SectionData::Stats(s) => s.enabled,
            SectionData::Cta(s) => s.enabled,
            SectionData::Contact(s) => s.enabled,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        match self {
            SectionData::Hero(s) => s.enabled = enabled,
            SectionData::About(s) => s.enabled = enabled,
            SectionData::Services(s) => s.enabled = enabled,
            SectionData::Features(s) => s.enabled = enabled,
            SectionData::Pricing(s) => s.enabled = enabled,
            SectionData::Testimonials(s) => s.enabled = enabled,
            SectionData::Faq(s) => s.enabled = enabled,
            SectionData::Team(s) => s.enabled = enabled,
            SectionData::Stats(s) => s.enabled = enabled,
            SectionData::Cta(s) => s.enabled = enabled,
            SectionData::Contact(s) => s.enabled = enabled,
        }
    }

    /// Decode a JSON object into the typed section for `kind` and run its content checks.
    pub fn from_value(kind: SectionKind, value: Value) -> Result<Self, ApiError> {
        let data = match kind {
            SectionKind::Hero => SectionData::Hero(decode(kind, value)?),
            SectionKind::About => SectionData::About(decode(kind, value)?),
            SectionKind::Services => SectionData::Services(decode(kind, value)?),
            SectionKind::Features => SectionData::Features(decode(kind, value)?),
            SectionKind::Pricing => SectionData::Pricing(decode(kind, value)?),
            SectionKind::Testimonials => SectionData::Testimonials(decode(kind, value)?),
            SectionKind::Faq => SectionData::Faq(decode(kind, value)?),
            SectionKind::Team => SectionData::Team(decode(kind, value)?),
            SectionKind::Stats => SectionData::Stats(decode(kind, value)?),
            SectionKind::Cta => SectionData::Cta(decode(kind, value)?),
            SectionKind::Contact => SectionData::Contact(decode(kind, value)?),
        };
        data.check()?;
        Ok(data)
    }

    pub fn to_value(&self) -> Value {
        let encoded = match self {
            SectionData::Hero(s) => serde_json::to_value(s),
            SectionData::About(s) => serde_json::to_value(s),
            SectionData::Services(s) => serde_json::to_value(s),
            SectionData::Features(s) => serde_json::to_value(s),
            SectionData::Pricing(s) => serde_json::to_value(s),
            SectionData::Testimonials(s) => serde_json::to_value(s),
            SectionData::Faq(s) => serde_json::to_value(s),
            SectionData::Team(s) => serde_json::to_value(s),
            SectionData::Stats(s) => serde_json::to_value(s),
            SectionData::Cta(s) => serde_json::to_value(s),
            SectionData::Contact(s) => serde_json::to_value(s),
        };
        // Plain structs of strings, bools and vectors always encode.
        encoded.unwrap_or(Value::Null)
    }

    /// Content rules beyond what the type enforces.
    pub fn check(&self) -> Result<(), ApiError> {
        let kind = self.kind();
        let fail = |message: &str| Err(ApiError::schema(kind.as_str(), message));

        if self.title().trim().is_empty() {
            return fail("title must not be empty");
        }
        match self {
            SectionData::Services(s) if s.items.iter().any(|i| i.name.trim().is_empty()) => {
                fail("service items require a name")
            }
            SectionData::Pricing(s) if s.plans.iter().any(|p| p.name.trim().is_empty()) => {
                fail("pricing plans require a name")
            }
            SectionData::Faq(s)
                if s
                    .items
                    .iter()
                    .any(|i| i.question.trim().is_empty() || i.answer.trim().is_empty()) =>
            {
                fail("faq items require a question and an answer")
            }
            SectionData::Testimonials(s) if s.items.iter().any(|t| t.quote.trim().is_empty()) => {
                fail("testimonials require a quote")
            }
            _ => Ok(()),
        }
    }
}

/// Encodes as the bare section object, without a kind tag.
impl Serialize for SectionData {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SectionData::Hero(s) => s.serialize(serializer),
            SectionData::About(s) => s.serialize(serializer),
            SectionData::Services(s) => s.serialize(serializer),
            SectionData::Features(s) => s.serialize(serializer),
            SectionData::Pricing(s) => s.serialize(serializer),
            SectionData::Testimonials(s) => s.serialize(serializer),
            SectionData::Faq(s) => s.serialize(serializer),
            SectionData::Team(s) => s.serialize(serializer),
            SectionData::Stats(s) => s.serialize(serializer),
            SectionData::Cta(s) => s.serialize(serializer),
            SectionData::Contact(s) => s.serialize(serializer),
        }
    }
}
