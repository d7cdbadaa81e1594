//! Brand identity: voice, style and values guiding generated content.
//!
//! Produced outside this crate and consumed read-only for the length of a run.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrandVoice {
    /// e.g. "formal", "conversational", "casual"
    #[serde(default)]
    pub formality: String,
    #[serde(default)]
    pub personality: Vec<String>,
    #[serde(default)]
    pub emotion: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrandStyle {
    /// e.g. "short", "medium", "long"
    #[serde(default)]
    pub sentence_length: String,
    /// e.g. "simple", "moderate", "advanced"
    #[serde(default)]
    pub vocabulary_level: String,
    #[serde(default)]
    pub use_jargon: bool,
    #[serde(default)]
    pub use_humor: bool,
    #[serde(default)]
    pub use_storytelling: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrandValues {
    #[serde(default)]
    pub core_values: Vec<String>,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub desired_action: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrandIdentity {
    pub name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub unique_value: String,
    #[serde(default)]
    pub voice: BrandVoice,
    #[serde(default)]
    pub style: BrandStyle,
    #[serde(default)]
    pub values: BrandValues,
}

impl BrandIdentity {
    /// Load an identity document from a `.json` or `.toml` file.
    pub fn from_file(path: &Path) -> Result<Self, ApiError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ApiError::ConfigError(format!(
                "Failed to read identity file {}: {}",
                path.display(),
                e
            ))
        })?;
        let identity: BrandIdentity = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|e| {
                ApiError::ConfigError(format!(
                    "Failed to parse identity file {}: {}",
                    path.display(),
                    e
                ))
            })?,
            _ => serde_json::from_str(&content).map_err(|e| {
                ApiError::ConfigError(format!(
                    "Failed to parse identity file {}: {}",
                    path.display(),
                    e
                ))
            })?,
        };
        identity.validate().map_err(ApiError::ConfigError)?;
        Ok(identity)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Brand identity name cannot be empty".to_string());
        }
        Ok(())
    }

    /// Stable digest of the identity, used to tell whether cached content was
    /// produced for this same identity.
    pub fn fingerprint(&self) -> String {
        // Struct fields serialize in declaration order, so the encoding is stable.
        let encoded = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(blake3::hash(&encoded).as_bytes())
    }

    /// Plain-text guideline block describing tone, style and values for prompts.
    pub fn brand_guidelines(&self) -> String {
        let mut lines = vec![format!("Brand: {}", self.name)];
        if !self.tagline.is_empty() {
            lines.push(format!("Tagline: {}", self.tagline));
        }
        if !self.unique_value.is_empty() {
            lines.push(format!("Unique value: {}", self.unique_value));
        }

        lines.push(String::new());
        lines.push("Tone of voice:".to_string());
        push_field(&mut lines, "Formality", &self.voice.formality);
        push_list(&mut lines, "Personality", &self.voice.personality);
        push_field(&mut lines, "Emotion", &self.voice.emotion);

        lines.push(String::new());
        lines.push("Writing style:".to_string());
        push_field(&mut lines, "Sentence length", &self.style.sentence_length);
        push_field(&mut lines, "Vocabulary level", &self.style.vocabulary_level);
        lines.push(format!("- Industry jargon: {}", yes_no(self.style.use_jargon)));
        lines.push(format!("- Humor: {}", yes_no(self.style.use_humor)));
        lines.push(format!(
            "- Storytelling: {}",
            yes_no(self.style.use_storytelling)
        ));

        lines.push(String::new());
        lines.push("Values and audience:".to_string());
        push_list(&mut lines, "Core values", &self.values.core_values);
        push_field(&mut lines, "Target audience", &self.values.target_audience);
        push_list(&mut lines, "Pain points", &self.values.pain_points);
        push_field(&mut lines, "Desired action", &self.values.desired_action);

        lines.join("\n")
    }
}

fn push_field(lines: &mut Vec<String>, label: &str, value: &str) {
    if !value.trim().is_empty() {
        lines.push(format!("- {}: {}", label, value));
    }
}

fn push_list(lines: &mut Vec<String>, label: &str, values: &[String]) {
    if !values.is_empty() {
        lines.push(format!("- {}: {}", label, values.join(", ")));
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "use"
    } else {
        "avoid"
    }
}
