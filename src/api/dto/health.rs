//! Health check DTOs for API responses.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Health check response structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` when the process can answer
    pub status: String,
    /// Application version
    pub version: String,
    /// Time the response was produced (RFC 3339)
    pub timestamp: Timestamp,
}

impl HealthResponse {
    pub fn ok(version: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            version: version.into(),
            timestamp: Timestamp::now(),
        }
    }
}
