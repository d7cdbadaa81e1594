//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to the page API.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::{command_name, needs_backend};
pub use output::{envelope, map_error, CommandOutput};
pub use parse::{Cli, Commands, IdentityCommands, OutputFormat, SegmentCommands};
pub use presentation::{
    format_edit_json, format_edit_text, format_identity_json, format_identity_text,
    format_page_json, format_page_list, format_page_text, format_quality_outcome_json,
    format_quality_outcome_text, format_regeneration_json, format_regeneration_text,
    format_segments_json, format_segments_text,
};
pub use route::RunContext;
