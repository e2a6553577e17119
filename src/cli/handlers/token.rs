//! Token command handler
//!
//! Fetches a management-API access token with the configured client
//! credentials and prints it to stdout.

use anyhow::Context;

use crate::config::settings::Settings;
use crate::external::ManagementTokenClient;

/// Handler for the token command
pub struct TokenCommandHandler {
    config: Settings,
    client: Option<ManagementTokenClient>,
}

impl TokenCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self {
            config,
            client: None,
        }
    }

    /// Use `client` instead of one built from the configured domain.
    pub fn with_client(mut self, client: ManagementTokenClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Fetches the token for `audience` (or `management.audience`).
    ///
    /// # Errors
    /// Missing credentials, an invalid domain or a failed token request.
    pub async fn fetch(&self, audience: Option<&str>) -> anyhow::Result<String> {
        let management = &self.config.management;
        if management.client_id.is_empty() || management.client_secret.is_empty() {
            anyhow::bail!("management.client_id and management.client_secret must be configured");
        }

        let audience = audience.unwrap_or(&management.audience);
        if audience.is_empty() {
            anyhow::bail!("no audience given and management.audience is not configured");
        }

        let client = match &self.client {
            Some(client) => client.clone(),
            None => ManagementTokenClient::new(self.config.management_domain())?,
        };

        tracing::debug!(url = %client.token_url(), audience = %audience, "Requesting management token");
        client
            .fetch_access_token(&management.client_id, &management.client_secret, audience)
            .await
            .with_context(|| format!("token request to {} failed", client.token_url()))
    }

    /// Fetches the token and prints it.
    pub async fn execute(&self, audience: Option<&str>) -> anyhow::Result<()> {
        let token = self.fetch(audience).await?;
        println!("{}", token);
        Ok(())
    }
}
