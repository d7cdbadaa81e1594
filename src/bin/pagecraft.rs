//! Pagecraft CLI Binary
//!
//! Command-line interface for brand-driven marketing page generation.

use anyhow::Context;
use clap::Parser;
use pagecraft::cli::{map_error, Cli, RunContext};
use pagecraft::config::ConfigLoader;
use pagecraft::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let logging_config = build_logging_config(&cli);
    if let Some(config) = &logging_config {
        if let Err(e) = init_logging(Some(config)) {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    }

    info!("Pagecraft CLI starting");

    let context = match RunContext::new(cli.workspace.clone(), cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error initializing workspace: {}", e);
            eprintln!("{}", map_error(&e, cli.format));
            process::exit(1);
        }
    };

    match context.execute(&cli.command, cli.format) {
        Ok(output) => {
            println!("{}", output.body);
            if !output.success {
                process::exit(2);
            }
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", map_error(&e, cli.format));
            process::exit(1);
        }
    }
}

/// Build logging configuration from CLI args and the config file.
/// Precedence: CLI flags override config file override defaults.
/// `None` means logging stays off.
fn build_logging_config(cli: &Cli) -> Option<LoggingConfig> {
    if cli.quiet {
        return None;
    }

    let mut config = load_logging_section(cli).unwrap_or_else(|e| {
        eprintln!("Warning: {:#}; using default logging", e);
        LoggingConfig::default()
    });

    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
    }
    Some(config)
}

fn load_logging_section(cli: &Cli) -> anyhow::Result<LoggingConfig> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => ConfigLoader::load(&cli.workspace).context("failed to load configuration")?,
    };
    Ok(config.logging)
}
