//! Output schemas handed to the generative backend, and the structural check
//! applied to whatever comes back.

use crate::error::ApiError;
use crate::page::merge::{expect_object, json_type_name};
use crate::page::{
    AboutSection, ContactSection, CtaSection, FaqSection, FeaturesSection, HeroSection, Page,
    PricingSection, SectionKind, ServicesSection, StatsSection, TeamSection, TestimonialsSection,
};
use crate::quality::QualityReport;
use schemars::JsonSchema;
use serde_json::{Map, Value};

/// A named JSON Schema document describing the expected backend output.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: String,
    pub schema: Value,
}

impl OutputSchema {
    pub fn for_type<T: JsonSchema>(name: impl Into<String>) -> Self {
        let root = schemars::schema_for!(T);
        Self {
            name: name.into(),
            schema: serde_json::to_value(root).unwrap_or(Value::Null),
        }
    }

    /// Full schema for one section kind.
    pub fn for_section(kind: SectionKind) -> Self {
        let name = kind.as_str();
        match kind {
            SectionKind::Hero => Self::for_type::<HeroSection>(name),
            SectionKind::About => Self::for_type::<AboutSection>(name),
            SectionKind::Services => Self::for_type::<ServicesSection>(name),
            SectionKind::Features => Self::for_type::<FeaturesSection>(name),
            SectionKind::Pricing => Self::for_type::<PricingSection>(name),
            SectionKind::Testimonials => Self::for_type::<TestimonialsSection>(name),
            SectionKind::Faq => Self::for_type::<FaqSection>(name),
            SectionKind::Team => Self::for_type::<TeamSection>(name),
            SectionKind::Stats => Self::for_type::<StatsSection>(name),
            SectionKind::Cta => Self::for_type::<CtaSection>(name),
            SectionKind::Contact => Self::for_type::<ContactSection>(name),
        }
    }

    pub fn for_page() -> Self {
        Self::for_type::<Page>("page")
    }

    pub fn for_quality_report() -> Self {
        Self::for_type::<QualityReport>("quality_report")
    }

    /// Narrow the schema to a subset of top-level properties, all required.
    /// Used to regenerate only some fields of a section.
    pub fn restrict_to(&self, fields: &[&str]) -> Self {
        let mut schema = self.schema.clone();
        if let Some(obj) = schema.as_object_mut() {
            if let Some(Value::Object(props)) = obj.get_mut("properties") {
                props.retain(|key, _| fields.contains(&key.as_str()));
                let required: Vec<Value> = props.keys().cloned().map(Value::String).collect();
                obj.insert("required".to_string(), Value::Array(required));
            }
        }
        Self {
            name: format!("{}:{}", self.name, fields.join(",")),
            schema,
        }
    }

    pub fn required_fields(&self) -> Vec<&str> {
        self.schema
            .get("required")
            .and_then(Value::as_array)
            .map(|fields| fields.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Pretty JSON rendering for embedding in prompts.
    pub fn to_prompt_string(&self) -> String {
        serde_json::to_string_pretty(&self.schema).unwrap_or_else(|_| "{}".to_string())
    }

    /// Structural check: the value must be an object carrying every required
    /// top-level field with a non-null value of the declared primitive type.
    pub fn check<'a>(&self, value: &'a Value) -> Result<&'a Map<String, Value>, ApiError> {
        let object = expect_object(&self.name, value)?;
        let missing: Vec<&str> = self
            .required_fields()
            .into_iter()
            .filter(|field| object.get(*field).map_or(true, Value::is_null))
            .collect();
        if !missing.is_empty() {
            return Err(ApiError::schema(
                &self.name,
                format!("missing required fields: {}", missing.join(", ")),
            ));
        }

        if let Some(props) = self.schema.get("properties").and_then(Value::as_object) {
            for (field, actual) in object {
                let expected = props
                    .get(field)
                    .and_then(|p| p.get("type"))
                    .and_then(Value::as_str);
                if let Some(expected) = expected {
                    if !actual.is_null() && !type_matches(expected, actual) {
                        return Err(ApiError::schema(
                            &self.name,
                            format!(
                                "field '{}' should be {}, got {}",
                                field,
                                expected,
                                json_type_name(actual)
                            ),
                        ));
                    }
                }
            }
        }
        Ok(object)
    }
}

fn type_matches(expected: &str, actual: &Value) -> bool {
    match expected {
        "string" => actual.is_string(),
        "boolean" => actual.is_boolean(),
        "array" => actual.is_array(),
        "object" => actual.is_object(),
        "number" => actual.is_number(),
        "integer" => actual.is_i64() || actual.is_u64(),
        _ => true,
    }
}
