//! Prompt templates
//!
//! Templates are plain text with `{placeholder}` markers substituted at render
//! time. Unknown placeholders are left untouched. A default set ships with the
//! crate; any template can be overridden by a file in the configured template
//! directory (`generation.txt`, `review.txt`, `edit.txt`, `assess.txt`,
//! `section.txt`, `retry.txt`, `simplify.txt`).

use crate::error::ApiError;
use std::collections::BTreeMap;
use std::path::Path;

const DEFAULT_GENERATION: &str = "\
You are writing a complete marketing landing page for the brand below.

{brand_guidelines}

Write a page title, a one-paragraph description, the brand name and a tagline.
Choose the sections that best serve the brand and list them in rendering order
in `section_order`. Always include a hero and a services section. Fill in every
section you list.

{cached_context}";

const DEFAULT_REVIEW: &str = "\
Review the draft landing page below as a senior editor. Tighten the copy, fix
inconsistencies between sections, and keep the brand voice consistent
throughout. Keep the same sections unless one is clearly redundant.

{brand_guidelines}

Draft page:
{draft}";

const DEFAULT_EDIT: &str = "\
Edit the landing page below for clarity, flow and persuasiveness. Preserve its
structure and every section listed in `section_order`.

{brand_guidelines}

Page:
{page}";

const DEFAULT_ASSESS: &str = "\
Assess the quality of each section of the landing page below. For every section
in [{section_list}] return a quality_score and a confidence_score between 0 and
1, a short rationale, and concrete recommendations for improvement.

{brand_guidelines}

Page:
{page}";

const DEFAULT_SECTION: &str = "\
You are writing the `{section_kind}` section of a landing page.

Page title: {page_title}
Page description: {page_description}
Brand name: {page_name}
Tagline: {page_tagline}
Sections on the page, in order: {section_order}
Current section: {current_section}
Retry: {is_retry}

{brand_guidelines}

{cached_context}";

const DEFAULT_RETRY: &str = "\
The previous attempt did not produce a valid result. Return exactly one JSON
object that matches the schema. Include every required field and no other text.";

const DEFAULT_SIMPLIFY: &str = "\
Keep the content short and simple: fewer items, plain sentences.";

/// Values substituted into a template, keyed by placeholder name.
#[derive(Debug, Clone, Default)]
pub struct PromptVars {
    values: BTreeMap<&'static str, String>,
}

impl PromptVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(key, value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    pub name: String,
    pub body: String,
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }

    /// Substitute `{key}` placeholders in one pass over the body. Substituted
    /// values are not scanned again; unknown placeholders stay as written.
    pub fn render(&self, vars: &PromptVars) -> String {
        let mut rendered = String::with_capacity(self.body.len());
        let mut rest = self.body.as_str();
        while let Some(open) = rest.find('{') {
            rendered.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let value = after
                .find('}')
                .and_then(|close| vars.get(&after[..close]).map(|value| (close, value)));
            match value {
                Some((close, value)) => {
                    rendered.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    rendered.push('{');
                    rest = after;
                }
            }
        }
        rendered.push_str(rest);
        rendered.trim_end().to_string()
    }
}

/// Every template the pipeline renders.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSet {
    pub generation: PromptTemplate,
    pub review: PromptTemplate,
    pub edit: PromptTemplate,
    pub assess: PromptTemplate,
    pub section: PromptTemplate,
    /// Appended to section prompts on retry.
    pub retry_instruction: String,
    /// Appended to section prompts when simplification is requested.
    pub simplify_instruction: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            generation: PromptTemplate::new("generation", DEFAULT_GENERATION),
            review: PromptTemplate::new("review", DEFAULT_REVIEW),
            edit: PromptTemplate::new("edit", DEFAULT_EDIT),
            assess: PromptTemplate::new("assess", DEFAULT_ASSESS),
            section: PromptTemplate::new("section", DEFAULT_SECTION),
            retry_instruction: DEFAULT_RETRY.to_string(),
            simplify_instruction: DEFAULT_SIMPLIFY.to_string(),
        }
    }
}

impl PromptSet {
    /// Defaults, overridden by whichever template files exist in `template_dir`.
    pub fn load(template_dir: Option<&Path>) -> Result<Self, ApiError> {
        let mut set = Self::default();
        let Some(dir) = template_dir else {
            return Ok(set);
        };
        if !dir.is_dir() {
            return Err(ApiError::ConfigError(format!(
                "Prompt template directory does not exist: {}",
                dir.display()
            )));
        }

        for template in [
            &mut set.generation,
            &mut set.review,
            &mut set.edit,
            &mut set.assess,
            &mut set.section,
        ] {
            if let Some(body) = read_override(dir, &template.name)? {
                template.body = body;
            }
        }
        if let Some(body) = read_override(dir, "retry")? {
            set.retry_instruction = body;
        }
        if let Some(body) = read_override(dir, "simplify")? {
            set.simplify_instruction = body;
        }
        Ok(set)
    }
}

fn read_override(dir: &Path, name: &str) -> Result<Option<String>, ApiError> {
    let path = dir.join(format!("{}.txt", name));
    if !path.is_file() {
        return Ok(None);
    }
    let body = std::fs::read_to_string(&path).map_err(|e| {
        ApiError::ConfigError(format!(
            "Failed to read prompt template {}: {}",
            path.display(),
            e
        ))
    })?;
    tracing::debug!(template = name, path = %path.display(), "Loaded prompt override");
    Ok(Some(body))
}
