//! CLI parse: clap types for Pagecraft. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pagecraft CLI - brand-driven marketing page generation
#[derive(Parser, Debug)]
#[command(name = "pagecraft")]
#[command(about = "Generate, assess and repair marketing pages from a brand identity")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, short, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a complete page for a brand identity
    Generate {
        /// Page id
        page: String,
        /// Identity file (JSON or TOML); stored for later commands
        #[arg(long)]
        identity: Option<PathBuf>,
        /// Page title override
        #[arg(long)]
        title: Option<String>,
        /// Page description override
        #[arg(long)]
        description: Option<String>,
        /// Brand name override
        #[arg(long)]
        name: Option<String>,
        /// Tagline override
        #[arg(long)]
        tagline: Option<String>,
        /// Section order override, e.g. hero,services,faq
        #[arg(long, value_delimiter = ',')]
        sections: Vec<String>,
    },
    /// Score every section against the quality thresholds
    #[command(alias = "qa")]
    Assess {
        /// Page id
        page: String,
        /// Regenerate the sections that fail
        #[arg(long)]
        apply: bool,
        #[arg(long)]
        min_combined: Option<f64>,
        #[arg(long)]
        min_quality: Option<f64>,
        #[arg(long)]
        min_confidence: Option<f64>,
    },
    /// Assess and regenerate failing sections
    #[command(alias = "apply-recommendations")]
    Apply {
        /// Page id
        page: String,
    },
    /// Regenerate missing, fallback and failing sections
    #[command(alias = "retry-failed")]
    RegenerateFailed {
        /// Page id
        page: String,
    },
    /// Regenerate specific sections
    Regenerate {
        /// Page id
        page: String,
        /// Section to regenerate; repeat or comma-separate for several
        #[arg(long = "section", required = true, value_delimiter = ',')]
        sections: Vec<String>,
    },
    /// Editorial pass over a stored page
    Edit {
        /// Page id
        page: String,
    },
    /// Show a stored page
    View {
        /// Page id
        page: String,
    },
    /// List stored pages
    List,
    /// Manage the brand identity of a page
    Identity {
        #[command(subcommand)]
        command: IdentityCommands,
    },
    /// Inspect or clear cached content segments
    Segments {
        #[command(subcommand)]
        command: SegmentCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum IdentityCommands {
    /// Store an identity file for a page
    Set {
        /// Page id
        page: String,
        /// Identity file (JSON or TOML)
        file: PathBuf,
    },
    /// Show the stored identity of a page
    Show {
        /// Page id
        page: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SegmentCommands {
    /// List cached segments
    List,
    /// Clear one segment kind, or every segment
    Clear {
        /// identity, service-offering, credibility or conversion
        kind: Option<String>,
    },
}
