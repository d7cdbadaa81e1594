//! CLI command-name contract for logging and routing.

use crate::cli::parse::{Commands, IdentityCommands, SegmentCommands};

/// Command name string for log spans (e.g. "assess", "identity.set").
pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::Generate { .. } => "generate".to_string(),
        Commands::Assess { .. } => "assess".to_string(),
        Commands::Apply { .. } => "apply".to_string(),
        Commands::RegenerateFailed { .. } => "regenerate_failed".to_string(),
        Commands::Regenerate { .. } => "regenerate".to_string(),
        Commands::Edit { .. } => "edit".to_string(),
        Commands::View { .. } => "view".to_string(),
        Commands::List => "list".to_string(),
        Commands::Identity { command } => format!("identity.{}", identity_command_name(command)),
        Commands::Segments { command } => format!("segments.{}", segment_command_name(command)),
    }
}

pub fn identity_command_name(command: &IdentityCommands) -> &'static str {
    match command {
        IdentityCommands::Set { .. } => "set",
        IdentityCommands::Show { .. } => "show",
    }
}

pub fn segment_command_name(command: &SegmentCommands) -> &'static str {
    match command {
        SegmentCommands::List => "list",
        SegmentCommands::Clear { .. } => "clear",
    }
}

/// Whether the command calls the generative backend.
pub fn needs_backend(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Generate { .. }
            | Commands::Assess { .. }
            | Commands::Apply { .. }
            | Commands::RegenerateFailed { .. }
            | Commands::Regenerate { .. }
            | Commands::Edit { .. }
    )
}
