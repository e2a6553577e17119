//! Current-caller DTOs.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::auth::{ScopeClaims, ValidatedClaims};

/// Summary of the caller's validated token.
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub subject: Option<String>,
    pub issuer: Option<String>,
    pub audience: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
    pub scopes: Vec<String>,
}

impl From<&ValidatedClaims<ScopeClaims>> for MeResponse {
    fn from(claims: &ValidatedClaims<ScopeClaims>) -> Self {
        Self {
            subject: claims.registered.subject.clone(),
            issuer: claims.registered.issuer.clone(),
            audience: claims.registered.audience.clone(),
            expires_at: claims.registered.expires_at(),
            scopes: claims
                .custom
                .scope
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Result of a scope check for the caller.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScopeCheckResponse {
    pub scope: String,
    pub granted: bool,
}
