//! Configuration System
//!
//! Layered configuration for providers, generation behavior, storage locations,
//! prompt templates and logging. Files and environment variables are merged by
//! [`ConfigLoader`]; the result is checked with [`PagecraftConfig::validate`].

use crate::error::ApiError;
use crate::generation::GenerationSettings;
use crate::logging::LoggingConfig;
use crate::provider::CompletionOptions;
use crate::quality::QualityThresholds;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub use crate::provider::{ProviderConfig, ProviderType};

mod facade;
mod merge;
mod sources;
mod storage;

pub use facade::ConfigLoader;
pub use sources::environment::ENV_PREFIX;
pub use sources::workspace_file::ENV_NAME_VAR;
pub use storage::StorageConfig;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PagecraftConfig {
    /// Model provider configurations, keyed by name
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub prompts: PromptsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Provider to generate with. Optional when exactly one is configured.
    #[serde(default)]
    pub provider: Option<String>,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_true")]
    pub simplify_on_retry: bool,

    #[serde(default = "default_true")]
    pub reuse_segments: bool,

    #[serde(default)]
    pub thresholds: QualityThresholds,

    /// Completion options taking precedence over the provider's defaults.
    #[serde(default)]
    pub completion: Option<CompletionOptions>,
}

fn default_max_retries() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: None,
            max_retries: default_max_retries(),
            simplify_on_retry: true,
            reuse_segments: true,
            thresholds: QualityThresholds::default(),
            completion: None,
        }
    }
}

impl GenerationConfig {
    pub fn settings(&self) -> GenerationSettings {
        GenerationSettings {
            max_retries: self.max_retries,
            simplify_on_retry: self.simplify_on_retry,
            reuse_segments: self.reuse_segments,
            thresholds: self.thresholds,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptsConfig {
    /// Directory with template overrides (`generation.txt`, `section.txt`, ...)
    #[serde(default)]
    pub template_dir: Option<PathBuf>,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Provider(String, String),
    Generation(String),
    Storage(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Provider(name, msg) => write!(f, "Provider '{}': {}", name, msg),
            ValidationError::Generation(msg) => write!(f, "Generation: {}", msg),
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl PagecraftConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for (name, provider) in &self.providers {
            if let Err(e) = provider.validate() {
                errors.push(ValidationError::Provider(name.clone(), e));
            }
        }

        if let Some(name) = &self.generation.provider {
            if !self.providers.contains_key(name) {
                errors.push(ValidationError::Generation(format!(
                    "Unknown provider '{}'",
                    name
                )));
            }
        }
        if let Err(e) = self.generation.thresholds.validate() {
            errors.push(ValidationError::Generation(e));
        }

        if let Err(e) = self.storage.validate() {
            errors.push(ValidationError::Storage(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold every problem into one `ConfigError`.
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }

    /// The provider generation runs against: `generation.provider` when set,
    /// otherwise the only configured provider.
    pub fn selected_provider(&self) -> Result<(&str, &ProviderConfig), ApiError> {
        if let Some(name) = &self.generation.provider {
            return self
                .providers
                .get_key_value(name)
                .map(|(name, provider)| (name.as_str(), provider))
                .ok_or_else(|| {
                    ApiError::ProviderNotConfigured(format!("Provider '{}' is not configured", name))
                });
        }
        let mut providers = self.providers.iter();
        match (providers.next(), providers.next()) {
            (Some((name, provider)), None) => Ok((name.as_str(), provider)),
            (None, _) => Err(ApiError::ProviderNotConfigured(
                "No providers configured; add a [providers.<name>] table".to_string(),
            )),
            (Some(_), Some(_)) => Err(ApiError::ConfigError(
                "Several providers configured; set generation.provider".to_string(),
            )),
        }
    }

    /// Completion options for `provider`, with generation overrides applied.
    pub fn completion_options(&self, provider: &ProviderConfig) -> CompletionOptions {
        match &self.generation.completion {
            Some(overrides) => overrides.clone().or(&provider.default_options),
            None => provider.default_options.clone(),
        }
    }
}
