//! Fallback Content
//!
//! Deterministic placeholder content per section kind, used whenever real
//! generation is unavailable so the page always stays structurally complete.
//! Every fallback is disabled (`enabled: false`) so renderers can hide it.

use crate::page::{
    AboutSection, ContactSection, CtaSection, FaqSection, FeaturesSection, HeroSection,
    PricingSection, SectionData, SectionKind, ServicesSection, StatsSection, TeamSection,
    TestimonialsSection,
};
use serde_json::{json, Value};

/// Placeholder content for `kind`. Pure and total.
pub fn fallback_content(kind: SectionKind) -> SectionData {
    match kind {
        SectionKind::Hero => SectionData::Hero(HeroSection {
            title: "Welcome".to_string(),
            subtitle: "We're putting the finishing touches on this page.".to_string(),
            cta_text: "Get in touch".to_string(),
            cta_link: "#contact".to_string(),
            image_alt: None,
            enabled: false,
        }),
        SectionKind::About => SectionData::About(AboutSection {
            title: "About Us".to_string(),
            body: "More about who we are is coming soon.".to_string(),
            mission: None,
            highlights: Vec::new(),
            enabled: false,
        }),
        SectionKind::Services => SectionData::Services(ServicesSection {
            title: "Our Services".to_string(),
            description: "Details about our services are coming soon.".to_string(),
            items: Vec::new(),
            enabled: false,
        }),
        SectionKind::Features => SectionData::Features(FeaturesSection {
            title: "Features".to_string(),
            items: Vec::new(),
            enabled: false,
        }),
        SectionKind::Pricing => SectionData::Pricing(PricingSection {
            title: "Pricing".to_string(),
            description: "Contact us for pricing.".to_string(),
            plans: Vec::new(),
            enabled: false,
        }),
        SectionKind::Testimonials => SectionData::Testimonials(TestimonialsSection {
            title: "What Our Customers Say".to_string(),
            items: Vec::new(),
            enabled: false,
        }),
        SectionKind::Faq => SectionData::Faq(FaqSection {
            title: "Frequently Asked Questions".to_string(),
            items: Vec::new(),
            enabled: false,
        }),
        SectionKind::Team => SectionData::Team(TeamSection {
            title: "Our Team".to_string(),
            members: Vec::new(),
            enabled: false,
        }),
        SectionKind::Stats => SectionData::Stats(StatsSection {
            title: "By the Numbers".to_string(),
            items: Vec::new(),
            enabled: false,
        }),
        SectionKind::Cta => SectionData::Cta(CtaSection {
            title: "Ready to get started?".to_string(),
            description: String::new(),
            button_text: "Contact us".to_string(),
            button_link: "#contact".to_string(),
            enabled: false,
        }),
        SectionKind::Contact => SectionData::Contact(ContactSection {
            title: "Contact".to_string(),
            description: "Contact details are coming soon.".to_string(),
            email: None,
            phone: None,
            address: None,
            form_enabled: false,
            enabled: false,
        }),
    }
}

/// Untyped fallback for callers that only hold a section name. Unrecognized
/// names get a minimal `{title, enabled: false}` placeholder.
pub fn fallback_for_name(name: &str) -> Value {
    match name.parse::<SectionKind>() {
        Ok(kind) => fallback_content(kind).to_value(),
        Err(_) => json!({
            "title": generic_title(name),
            "enabled": false,
        }),
    }
}

fn generic_title(name: &str) -> String {
    let words: Vec<String> = name
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    if words.is_empty() {
        "Section".to_string()
    } else {
        words.join(" ")
    }
}
