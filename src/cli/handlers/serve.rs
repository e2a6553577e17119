//! Serve command handler
//!
//! Handles the serve command: dry-run validation or server startup.

use crate::api::middleware::{cors_layer, create_jwt_auth};
use crate::auth::ScopeClaims;
use crate::config::settings::Settings;
use crate::server::Server;

/// Handler for the serve command
pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    /// Create a new serve command handler
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Execute the serve command with optional dry-run support
    ///
    /// # Errors
    /// - Configuration validation errors
    /// - Server startup errors (if not dry-run)
    pub async fn execute(self, dry_run: bool) -> anyhow::Result<()> {
        if dry_run {
            self.validate_only()
        } else {
            Server::new(self.config).run().await
        }
    }

    /// Validate configuration without starting the server
    ///
    /// Builds every middleware the server would build, except that the key
    /// set is never fetched.
    pub fn validate_only(&self) -> anyhow::Result<()> {
        self.config.validate()?;
        println!("✓ Configuration is valid");
        println!("✓ Server would bind to: {}", self.config.server.address());

        let _cors = cors_layer(&self.config.cors)?;
        println!(
            "✓ CORS policy built for {} origin(s)",
            self.config.cors.allowed_origins.len()
        );

        if self.config.auth.enabled() {
            let (_, jwks) = create_jwt_auth::<ScopeClaims>(&self.config.auth)?;
            println!("✓ JWT validation configured, keys from {}", jwks.jwks_url());
        } else {
            println!("✓ JWT validation disabled (auth.domain is empty)");
        }

        println!("Dry run completed successfully - configuration is ready for deployment");
        Ok(())
    }

    /// Get the configuration
    pub fn config(&self) -> &Settings {
        &self.config
    }
}
