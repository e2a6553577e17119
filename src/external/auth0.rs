//! Machine-to-machine token client for the identity provider's management API.
//!
//! Exchanges client credentials for an access token with a single
//! `client_credentials` grant. No caching and no retries.

use axum::http::uri::Authority;
use serde::Serialize;
use thiserror::Error;

use super::client::HTTP_CLIENT;

/// Errors raised while obtaining a management-API token
#[derive(Debug, Error)]
pub enum ManagementTokenError {
    #[error("invalid identity provider domain '{0}'")]
    InvalidDomain(String),

    #[error("failed executing access token request")]
    Request(#[from] reqwest::Error),

    #[error("failed unmarshalling access token response")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("access token response did not provide an access token (status {status})")]
    MissingAccessToken { status: u16 },

    #[error("unexpected type '{kind}' encountered for access token in response")]
    UnexpectedAccessTokenType { kind: &'static str },
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    audience: &'a str,
    grant_type: &'static str,
}

/// Client for `POST https://{domain}/oauth/token`.
#[derive(Debug, Clone)]
pub struct ManagementTokenClient {
    token_url: String,
    client: reqwest::Client,
}

impl ManagementTokenClient {
    /// # Errors
    /// Returns [`ManagementTokenError::InvalidDomain`] unless `domain` is a
    /// bare host (optionally with port).
    pub fn new(domain: &str) -> Result<Self, ManagementTokenError> {
        let invalid = || ManagementTokenError::InvalidDomain(domain.to_string());
        if domain.is_empty() || domain.contains('/') {
            return Err(invalid());
        }
        domain.parse::<Authority>().map_err(|_| invalid())?;

        Ok(Self {
            token_url: format!("https://{}/oauth/token", domain),
            client: HTTP_CLIENT.clone(),
        })
    }

    /// Overrides the token endpoint, e.g. to target a plain-HTTP test server.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Requests a token for `audience` with the client credentials grant.
    pub async fn fetch_access_token(
        &self,
        client_id: &str,
        client_secret: &str,
        audience: &str,
    ) -> Result<String, ManagementTokenError> {
        let response = self
            .client
            .post(&self.token_url)
            .json(&TokenRequest {
                client_id,
                client_secret,
                audience,
                grant_type: "client_credentials",
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        tracing::debug!(url = %self.token_url, status = status.as_u16(), "Access token response received");

        parse_access_token(&body).map_err(|e| match e {
            ManagementTokenError::MissingAccessToken { .. } => ManagementTokenError::MissingAccessToken {
                status: status.as_u16(),
            },
            other => other,
        })
    }
}

/// Pulls the string `access_token` out of a token-endpoint response body.
pub fn parse_access_token(body: &[u8]) -> Result<String, ManagementTokenError> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    match value.get("access_token") {
        None => Err(ManagementTokenError::MissingAccessToken { status: 200 }),
        Some(serde_json::Value::String(token)) => Ok(token.clone()),
        Some(other) => Err(ManagementTokenError::UnexpectedAccessTokenType {
            kind: json_kind(other),
        }),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
