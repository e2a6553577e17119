//! CLI module for webutil-rs
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing with clap
//! - Configuration loading with CLI overrides
//! - Command handlers for serve and token operations

pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

// Re-export public types for convenience
pub use executor::execute_command;
pub use parser::{Cli, Commands};

use anyhow::Context;

use crate::config::{ConfigLoader, settings::Settings};
use crate::logger::init_logger;

/// Load configuration and apply CLI argument overrides
///
/// Precedence, lowest first: configuration files, `WEBUTIL_*` environment
/// variables, `--host`/`--port`, `--verbose`/`--quiet`. The result is
/// validated after the overrides are applied.
///
/// # Errors
/// Returns error if configuration loading or validation fails
pub fn load_config(cli: &Cli) -> anyhow::Result<Settings> {
    let mut loader = ConfigLoader::new()?;
    if let Some(env) = cli.env {
        loader = loader.with_environment(env);
    }
    if let Some(path) = &cli.config {
        loader = loader.with_config_file(path);
    }

    let mut settings = loader
        .load_unvalidated()
        .context("Failed to load configuration")?;
    apply_cli_overrides(cli, &mut settings);
    settings.validate().context("Invalid configuration")?;
    Ok(settings)
}

fn apply_cli_overrides(cli: &Cli, settings: &mut Settings) {
    if let Some(Commands::Serve { host, port, .. }) = &cli.command {
        if let Some(host) = host {
            settings.server.host = host.clone();
        }
        if let Some(port) = port {
            settings.server.port = *port;
        }
    }

    if cli.verbose {
        settings.logger.level = "debug".to_string();
    } else if cli.quiet {
        settings.logger.level = "error".to_string();
    }
}

/// Initialize logger from settings
///
/// # Errors
/// Returns error if logger initialization fails
pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<()> {
    let logger_config = settings
        .logger
        .clone()
        .into_logger_config()
        .context("Logger configuration error")?;
    init_logger(logger_config).context("Logger initialization error")?;
    Ok(())
}
