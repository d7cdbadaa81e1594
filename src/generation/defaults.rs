//! Minimal defaults, backend-output sanitizing and structural repair for pages.

use crate::error::ApiError;
use crate::fallback::fallback_content;
use crate::identity::BrandIdentity;
use crate::page::merge::expect_object;
use crate::page::{Page, SectionData, SectionKind};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::warn;

const DEFAULT_TITLE: &str = "Welcome";
const DEFAULT_DESCRIPTION: &str = "Learn more about what we do and how we can help.";
const DEFAULT_NAME: &str = "Our Company";
const DEFAULT_TAGLINE: &str = "Built for you.";

/// Caller-supplied values applied after generation, with highest precedence.
/// Blank strings and empty orders are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageOverrides {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub section_order: Option<Vec<SectionKind>>,
}

impl PageOverrides {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.name.is_none()
            && self.tagline.is_none()
            && self.section_order.is_none()
    }

    pub fn apply(&self, page: &mut Page) {
        for (slot, value) in [
            (&mut page.title, &self.title),
            (&mut page.description, &self.description),
            (&mut page.name, &self.name),
            (&mut page.tagline, &self.tagline),
        ] {
            if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                *slot = value.to_string();
            }
        }
        if let Some(order) = self.section_order.as_ref().filter(|o| !o.is_empty()) {
            page.section_order = order.clone();
        }
    }
}

/// Check that backend output is a page object. Unknown names in
/// `section_order` and any `meta` the backend invented are dropped; a known
/// section that does not decode rejects the whole object.
pub fn sanitize_page_value(value: &Value) -> Result<Map<String, Value>, ApiError> {
    let mut page = expect_object("page", value)?.clone();
    page.remove("meta");

    if let Some(order) = page.remove("section_order") {
        match order {
            Value::Array(names) => {
                let mut kinds = Vec::new();
                for name in names {
                    match name.as_str().map(str::parse::<SectionKind>) {
                        Some(Ok(kind)) => {
                            if !kinds.contains(&kind) {
                                kinds.push(kind);
                            }
                        }
                        _ => warn!(section = %name, "Dropping unknown section from section_order"),
                    }
                }
                let kinds: Vec<Value> = kinds
                    .into_iter()
                    .map(|k| Value::String(k.as_str().to_string()))
                    .collect();
                page.insert("section_order".to_string(), Value::Array(kinds));
            }
            Value::Null => {}
            other => {
                warn!(found = %other, "Ignoring section_order that is not a list");
            }
        }
    }

    for kind in SectionKind::ALL {
        let Some(section) = page.get(kind.as_str()) else {
            continue;
        };
        if section.is_null() {
            page.remove(kind.as_str());
            continue;
        }
        SectionData::from_value(kind, section.clone())
            .map_err(|e| ApiError::schema("page", format!("section {}: {}", kind, e)))?;
    }
    Ok(page)
}

/// Replace a section with fallback content and record it as such.
pub fn install_fallback(page: &mut Page, kind: SectionKind) {
    page.set_section(fallback_content(kind));
    page.meta.fallback_sections.insert(kind);
    page.meta.assessments.remove(&kind);
    if !page.section_order.contains(&kind) {
        page.section_order.push(kind);
    }
}

/// Deduplicate `section_order` and give every listed kind without content a
/// fallback. Returns the kinds that were filled in.
pub fn enforce_section_order(page: &mut Page) -> Vec<SectionKind> {
    let mut seen = BTreeSet::new();
    page.section_order.retain(|kind| seen.insert(*kind));
    if page.section_order.is_empty() {
        page.section_order = SectionKind::REQUIRED.to_vec();
    }

    let missing = page.missing_sections();
    for kind in &missing {
        install_fallback(page, *kind);
    }
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|k| k.as_str()).collect();
        warn!(sections = %names.join(","), "Filled missing sections with fallback content");
    }
    missing
}

/// Fill empty required scalars from the identity, then from fixed defaults.
pub fn backfill_scalars(page: &mut Page, identity: Option<&BrandIdentity>) {
    if page.name.trim().is_empty() {
        page.name =
            identity_field(identity, |i| &i.name).unwrap_or_else(|| DEFAULT_NAME.to_string());
    }
    if page.title.trim().is_empty() {
        page.title =
            identity_field(identity, |i| &i.name).unwrap_or_else(|| DEFAULT_TITLE.to_string());
    }
    if page.tagline.trim().is_empty() {
        page.tagline = identity_field(identity, |i| &i.tagline)
            .unwrap_or_else(|| DEFAULT_TAGLINE.to_string());
    }
    if page.description.trim().is_empty() {
        page.description = identity_field(identity, |i| &i.unique_value)
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
    }
}

fn identity_field(
    identity: Option<&BrandIdentity>,
    pick: fn(&BrandIdentity) -> &str,
) -> Option<String> {
    identity
        .map(pick)
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

/// Turn the winning pipeline output into a structurally complete page:
/// defaults underneath, backend content over them, overrides on top.
pub fn finalize_page(
    winner: Map<String, Value>,
    identity: &BrandIdentity,
    overrides: Option<&PageOverrides>,
) -> Result<Page, ApiError> {
    let mut page = Page::from_value(Value::Object(winner))?;

    backfill_scalars(&mut page, Some(identity));
    if page.section_order.is_empty() {
        page.section_order = SectionKind::REQUIRED.to_vec();
    }
    for kind in SectionKind::REQUIRED {
        if !page.has_section(kind) {
            install_fallback(&mut page, kind);
        }
    }
    if let Some(overrides) = overrides {
        overrides.apply(&mut page);
    }
    enforce_section_order(&mut page);

    page.meta.generated_at = Some(Utc::now());
    page.validate_structure()?;
    Ok(page)
}
