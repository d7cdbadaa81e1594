//! Environment source: `PAGECRAFT__SECTION__KEY=value`.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub const ENV_PREFIX: &str = "PAGECRAFT";

/// `PAGECRAFT__GENERATION__MAX_RETRIES=5` sets `generation.max_retries`.
/// The double underscore keeps `PAGECRAFT_LOG*` and `PAGECRAFT_ENV` out.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}
