//! Merge rules: defaults, override order, conflict handling.
//!
//! Later sources override earlier ones key by key: defaults, global file,
//! workspace files, environment.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("generation.max_retries", 3)?
        .set_default("generation.simplify_on_retry", true)?
        .set_default("generation.reuse_segments", true)?
        .set_default("storage.data_dir", ".pagecraft")?
        .set_default("logging.output", "stderr")
}
