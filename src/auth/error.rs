//! Authentication error types

use thiserror::Error;

/// Errors raised while extracting or validating an access token
#[derive(Debug, Error)]
pub enum AuthError {
    /// No extractor produced a token
    #[error("no access token found in request")]
    MissingToken,

    /// A token source was present but not in the expected shape
    #[error("malformed token source: {0}")]
    MalformedToken(String),

    /// Signature, issuer, audience or time checks failed
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    /// The token header carries no `kid`
    #[error("token header has no key id")]
    MissingKeyId,

    /// The key set does not contain the token's `kid`
    #[error("no signing key found for key id '{0}'")]
    UnknownKey(String),

    /// Fetching or parsing the key set failed
    #[error("failed to fetch key set from {url}")]
    KeySet {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    /// Application-specific claim checks failed
    #[error("custom claims rejected: {0}")]
    CustomClaims(String),

    /// The validator cannot be built from the given settings
    #[error("invalid auth configuration: {0}")]
    Configuration(String),
}

impl AuthError {
    pub fn configuration(message: impl Into<String>) -> Self {
        AuthError::Configuration(message.into())
    }

    /// Construction-time failures that should stop the process.
    pub fn is_configuration(&self) -> bool {
        matches!(self, AuthError::Configuration(_))
    }
}
