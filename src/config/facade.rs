//! Layered configuration loading.

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::PagecraftConfig;
use crate::error::ApiError;
use config::File;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (lowest to highest): built-in defaults, global config file,
    /// `config/config.toml`, `config/{PAGECRAFT_ENV}.toml`, environment.
    pub fn load(workspace_root: &Path) -> Result<PagecraftConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);

        let config: PagecraftConfig = builder.build()?.try_deserialize()?;
        debug!(
            workspace = %workspace_root.display(),
            providers = config.providers.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load a single explicit config file over the built-in defaults.
    pub fn load_from_file(path: &Path) -> Result<PagecraftConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config = merge_policy::builder_with_defaults()?
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Built-in defaults only.
    pub fn default() -> PagecraftConfig {
        PagecraftConfig::default()
    }

    /// Location of the global config file, if one could be determined.
    pub fn xdg_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
