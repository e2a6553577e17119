//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::build;
use crate::config::Environment;

/// HTTP middleware toolkit demo server
#[derive(Parser, Debug)]
#[command(name = "webutil-rs")]
#[command(about = "Access logging, JWT auth and CORS middleware for axum services")]
#[command(long_about = "
webutil-rs serves a small demonstration API with structured access logging,
JWT validation against an identity provider, request IDs and CORS wired in.
It can also fetch a management-API token with client credentials.

EXAMPLES:
    # Start the server with default configuration
    webutil-rs serve

    # Start server on custom host and port
    webutil-rs serve --host 0.0.0.0 --port 8080

    # Use custom configuration file
    webutil-rs --config /path/to/config.toml serve

    # Check configuration without starting server
    webutil-rs serve --dry-run

    # Print a management-API token
    webutil-rs token
")]
#[command(version = build::CLAP_LONG_VERSION)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Load this single TOML file instead of the layered configuration
    /// directory. The file must exist and be readable.
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Picks the `{environment}.toml` overlay instead of `WEBUTIL_APP_ENV`.
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web server (default)
    ///
    /// Examples:
    ///   webutil-rs serve                           # Start with defaults
    ///   webutil-rs serve --host 0.0.0.0 --port 80  # Bind to all interfaces on port 80
    ///   webutil-rs serve --dry-run                 # Validate config without starting
    Serve {
        /// Host address to bind to
        ///
        /// Default: 127.0.0.1
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::validate_host_address)]
        host: Option<String>,

        /// Port number to listen on
        ///
        /// Default: 3000
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::validate_port)]
        port: Option<u16>,

        /// Validate configuration and exit
        ///
        /// Builds the CORS layer and the JWT validator without binding or
        /// contacting the identity provider.
        #[arg(long)]
        dry_run: bool,
    },
    /// Fetch a management-API access token and print it
    ///
    /// Uses `management.client_id`, `management.client_secret` and the
    /// management (or auth) domain from configuration.
    Token {
        /// Audience to request; defaults to `management.audience`
        #[arg(long, value_name = "AUDIENCE")]
        audience: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["webutil-rs", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_default_behavior() {
        let cli = Cli::try_parse_from(["webutil-rs"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
        assert!(!cli.quiet);
        assert!(cli.config.is_none());
        assert!(cli.env.is_none());
    }

    #[test]
    fn test_serve_command() {
        let cli = Cli::try_parse_from([
            "webutil-rs",
            "--env",
            "production",
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
        ])
        .unwrap();

        assert_eq!(cli.env, Some(Environment::Production));
        match cli.command {
            Some(Commands::Serve { host, port, dry_run }) => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(8080));
                assert!(!dry_run);
            }
            other => panic!("Expected Serve command, got {:?}", other),
        }
    }

    #[test]
    fn test_token_command() {
        let cli =
            Cli::try_parse_from(["webutil-rs", "token", "--audience", "https://x.test/api/v2/"])
                .unwrap();
        match cli.command {
            Some(Commands::Token { audience }) => {
                assert_eq!(audience.as_deref(), Some("https://x.test/api/v2/"));
            }
            other => panic!("Expected Token command, got {:?}", other),
        }
    }

    #[test]
    fn test_conflicting_verbose_quiet() {
        let err = Cli::try_parse_from(["webutil-rs", "--verbose", "--quiet"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(Cli::try_parse_from(["webutil-rs", "serve", "--port", "0"]).is_err());
    }
}
