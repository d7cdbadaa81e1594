//! CLI route: single route table and run context. Dispatches to the page API
//! and presentation.

use crate::api::{backend_from_config, PageApi};
use crate::cli::help::{command_name, needs_backend};
use crate::cli::output::{envelope, CommandOutput};
use crate::cli::parse::{Commands, IdentityCommands, OutputFormat, SegmentCommands};
use crate::cli::presentation::{
    format_edit_json, format_edit_text, format_identity_json, format_identity_text,
    format_page_json, format_page_list, format_page_text, format_quality_outcome_json,
    format_quality_outcome_text, format_regeneration_json, format_regeneration_text,
    format_segments_json, format_segments_text,
};
use crate::config::{ConfigLoader, PagecraftConfig};
use crate::error::ApiError;
use crate::generation::PageOverrides;
use crate::identity::BrandIdentity;
use crate::page::SectionKind;
use crate::provider::GenerativeBackend;
use crate::quality::QualityThresholds;
use crate::schema::OutputSchema;
use crate::segment::SegmentKind;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span};

/// Runtime context for CLI execution: workspace, configuration and the page API.
pub struct RunContext {
    api: PageApi,
    config: PagecraftConfig,
    workspace_root: PathBuf,
    /// Why no backend could be built, if none could.
    backend_error: Option<String>,
    runtime: tokio::runtime::Runtime,
}

/// Backend used when no provider is configured. Commands that need a backend
/// are refused before reaching it.
struct UnavailableBackend {
    reason: String,
}

#[async_trait]
impl GenerativeBackend for UnavailableBackend {
    async fn invoke(&self, _prompt: &str, _schema: &OutputSchema) -> Result<Value, ApiError> {
        Err(ApiError::ProviderNotConfigured(self.reason.clone()))
    }
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        config.ensure_valid()?;

        let (backend, backend_error): (Arc<dyn GenerativeBackend>, Option<String>) =
            match backend_from_config(&config) {
                Ok(backend) => (backend, None),
                Err(e) => {
                    debug!(error = %e, "No generation backend available");
                    let reason = e.to_string();
                    (
                        Arc::new(UnavailableBackend {
                            reason: reason.clone(),
                        }),
                        Some(reason),
                    )
                }
            };

        Self::with_backend(workspace_root, config, backend, backend_error)
    }

    /// Build a context around an explicit backend.
    pub fn with_backend(
        workspace_root: PathBuf,
        config: PagecraftConfig,
        backend: Arc<dyn GenerativeBackend>,
        backend_error: Option<String>,
    ) -> Result<Self, ApiError> {
        let api = PageApi::from_config(&config, &workspace_root, backend)?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to create runtime: {}", e)))?;
        Ok(Self {
            api,
            config,
            workspace_root,
            backend_error,
            runtime,
        })
    }

    /// Reference to the underlying page API.
    pub fn api(&self) -> &PageApi {
        &self.api
    }

    pub fn config(&self) -> &PagecraftConfig {
        &self.config
    }

    pub fn workspace_root(&self) -> &std::path::Path {
        &self.workspace_root
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(
        &self,
        command: &Commands,
        format: OutputFormat,
    ) -> Result<CommandOutput, ApiError> {
        let name = command_name(command);
        let span = info_span!("command", command = %name);
        let _entered = span.enter();

        if needs_backend(command) {
            if let Some(reason) = &self.backend_error {
                return Err(ApiError::ProviderNotConfigured(reason.clone()));
            }
        }

        let started = Instant::now();
        let result = self.execute_inner(command, format);
        info!(
            ok = result.as_ref().map(|o| o.success).unwrap_or(false),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(
        &self,
        command: &Commands,
        format: OutputFormat,
    ) -> Result<CommandOutput, ApiError> {
        match command {
            Commands::Generate {
                page,
                identity,
                title,
                description,
                name,
                tagline,
                sections,
            } => {
                let identity = identity
                    .as_ref()
                    .map(|path| BrandIdentity::from_file(path))
                    .transpose()?;
                let overrides = PageOverrides {
                    title: title.clone(),
                    description: description.clone(),
                    name: name.clone(),
                    tagline: tagline.clone(),
                    section_order: if sections.is_empty() {
                        None
                    } else {
                        Some(parse_sections(sections)?)
                    },
                };
                let overrides = (!overrides.is_empty()).then_some(overrides);
                let generated = self.runtime.block_on(self.api.generate(
                    page,
                    identity,
                    overrides.as_ref(),
                ))?;
                Ok(CommandOutput::ok(match format {
                    OutputFormat::Json => format_page_json(page, &generated, "Page generated"),
                    OutputFormat::Text => format_page_text(page, &generated),
                }))
            }
            Commands::Assess {
                page,
                apply,
                min_combined,
                min_quality,
                min_confidence,
            } => {
                let thresholds =
                    self.thresholds(*min_combined, *min_quality, *min_confidence)?;
                self.assess(page, thresholds, *apply, format)
            }
            Commands::Apply { page } => self.assess(page, None, true, format),
            Commands::RegenerateFailed { page } => {
                let summary = self.runtime.block_on(self.api.regenerate_failed(page))?;
                Ok(CommandOutput::with_success(
                    summary.success,
                    match format {
                        OutputFormat::Json => format_regeneration_json(page, &summary),
                        OutputFormat::Text => format_regeneration_text(&summary),
                    },
                ))
            }
            Commands::Regenerate { page, sections } => {
                let kinds = parse_sections(sections)?;
                let summary = self
                    .runtime
                    .block_on(self.api.regenerate_sections(page, &kinds))?;
                Ok(CommandOutput::with_success(
                    summary.success,
                    match format {
                        OutputFormat::Json => format_regeneration_json(page, &summary),
                        OutputFormat::Text => format_regeneration_text(&summary),
                    },
                ))
            }
            Commands::Edit { page } => {
                let outcome = self.runtime.block_on(self.api.edit(page))?;
                Ok(CommandOutput::ok(match format {
                    OutputFormat::Json => format_edit_json(page, &outcome),
                    OutputFormat::Text => format_edit_text(page, &outcome),
                }))
            }
            Commands::View { page } => {
                let stored = self.api.view(page)?;
                Ok(CommandOutput::ok(match format {
                    OutputFormat::Json => format_page_json(page, &stored, "Page loaded"),
                    OutputFormat::Text => format_page_text(page, &stored),
                }))
            }
            Commands::List => {
                let pages = self.api.list_pages()?;
                Ok(CommandOutput::ok(format_page_list(&pages, format)))
            }
            Commands::Identity { command } => self.execute_identity(command, format),
            Commands::Segments { command } => self.execute_segments(command, format),
        }
    }

    fn execute_identity(
        &self,
        command: &IdentityCommands,
        format: OutputFormat,
    ) -> Result<CommandOutput, ApiError> {
        match command {
            IdentityCommands::Set { page, file } => {
                let identity = BrandIdentity::from_file(file)?;
                self.runtime
                    .block_on(self.api.set_identity(page, &identity))?;
                Ok(CommandOutput::ok(match format {
                    OutputFormat::Json => format_identity_json(page, &identity, "Identity stored"),
                    OutputFormat::Text => format!("Identity '{}' stored for {}", identity.name, page),
                }))
            }
            IdentityCommands::Show { page } => {
                let identity = self.api.identity(page)?;
                Ok(CommandOutput::ok(match format {
                    OutputFormat::Json => format_identity_json(page, &identity, "Identity loaded"),
                    OutputFormat::Text => format_identity_text(page, &identity),
                }))
            }
        }
    }

    fn execute_segments(
        &self,
        command: &SegmentCommands,
        format: OutputFormat,
    ) -> Result<CommandOutput, ApiError> {
        match command {
            SegmentCommands::List => {
                let segments = self.api.segments();
                Ok(CommandOutput::ok(match format {
                    OutputFormat::Json => format_segments_json(&segments),
                    OutputFormat::Text => format_segments_text(&segments),
                }))
            }
            SegmentCommands::Clear { kind } => {
                let kind = kind
                    .as_deref()
                    .map(str::parse::<SegmentKind>)
                    .transpose()?;
                self.api.clear_segments(kind);
                let message = match kind {
                    Some(kind) => format!("Cleared cached segment '{}'", kind),
                    None => "Cleared all cached segments".to_string(),
                };
                Ok(CommandOutput::ok(match format {
                    OutputFormat::Json => envelope(true, &message, &json!({ "cleared": kind })),
                    OutputFormat::Text => message,
                }))
            }
        }
    }

    fn assess(
        &self,
        page: &str,
        thresholds: Option<QualityThresholds>,
        apply: bool,
        format: OutputFormat,
    ) -> Result<CommandOutput, ApiError> {
        let outcome = self
            .runtime
            .block_on(self.api.assess(page, thresholds, apply))?;
        Ok(CommandOutput::with_success(
            outcome.success,
            match format {
                OutputFormat::Json => format_quality_outcome_json(page, &outcome),
                OutputFormat::Text => format_quality_outcome_text(page, &outcome),
            },
        ))
    }

    /// Configured thresholds with any command-line overrides applied.
    fn thresholds(
        &self,
        min_combined: Option<f64>,
        min_quality: Option<f64>,
        min_confidence: Option<f64>,
    ) -> Result<Option<QualityThresholds>, ApiError> {
        if min_combined.is_none() && min_quality.is_none() && min_confidence.is_none() {
            return Ok(None);
        }
        let base = self.config.generation.thresholds;
        let thresholds = QualityThresholds {
            min_combined: min_combined.unwrap_or(base.min_combined),
            min_quality: min_quality.unwrap_or(base.min_quality),
            min_confidence: min_confidence.unwrap_or(base.min_confidence),
        };
        thresholds.validate().map_err(ApiError::ConfigError)?;
        Ok(Some(thresholds))
    }
}

fn parse_sections(names: &[String]) -> Result<Vec<SectionKind>, ApiError> {
    let mut kinds = Vec::with_capacity(names.len());
    for name in names {
        let kind: SectionKind = name.trim().parse()?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}
