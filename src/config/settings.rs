//! Configuration settings structures for webutil-rs
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::access_log::DEFAULT_HEALTH_CHECK_PATH;
use crate::config::error::ConfigError;
use crate::logger::{LogFormat, LoggerConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "webutil-rs".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_cors_allowed_headers() -> Vec<String> {
    vec![
        "accept".to_string(),
        "authorization".to_string(),
        "content-type".to_string(),
    ]
}

fn default_cors_max_age() -> u64 {
    60
}

fn default_auth_algorithm() -> String {
    "RS256".to_string()
}

fn default_clock_skew() -> u64 {
    60
}

fn default_jwks_refresh_interval() -> u64 {
    300 // 5 minutes
}

fn default_health_check_path() -> String {
    DEFAULT_HEALTH_CHECK_PATH.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "full".to_string()
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Application version
    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Server Configuration
// ============================================================================

/// Axum HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    /// Get the full server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// ============================================================================
// CORS Configuration
// ============================================================================

/// Cross-origin resource sharing policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. Required. One `*` wildcard per entry is allowed,
    /// e.g. `https://*.example.com`.
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Methods allowed in addition to GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS
    #[serde(default)]
    pub allowed_methods: Vec<String>,

    /// Headers allowed in addition to origin, content-length, content-type
    #[serde(default = "default_cors_allowed_headers")]
    pub allowed_headers: Vec<String>,

    /// Stop sending `Access-Control-Allow-Credentials: true`
    #[serde(default)]
    pub disable_credentials: bool,

    /// Response headers exposed to the browser
    #[serde(default)]
    pub expose_headers: Vec<String>,

    /// Preflight cache lifetime in seconds
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allowed_methods: Vec::new(),
            allowed_headers: default_cors_allowed_headers(),
            disable_credentials: false,
            expose_headers: Vec::new(),
            max_age: default_cors_max_age(),
        }
    }
}

// ============================================================================
// Auth Configuration
// ============================================================================

/// JWT validation against an OpenID identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Identity provider domain, e.g. `tenant.eu.auth0.com`. Empty disables auth.
    #[serde(default)]
    pub domain: String,

    /// Accepted `aud` values
    #[serde(default)]
    pub audiences: Vec<String>,

    /// Signature algorithm, e.g. RS256
    #[serde(default = "default_auth_algorithm")]
    pub algorithm: String,

    /// Tolerance applied to exp/nbf/iat in seconds
    #[serde(default = "default_clock_skew")]
    pub allowed_clock_skew_secs: u64,

    /// Key-set refresh interval in seconds
    #[serde(default = "default_jwks_refresh_interval")]
    pub jwks_refresh_interval_secs: u64,

    /// Cookie consulted when no Authorization header is present
    #[serde(default)]
    pub token_cookie: Option<String>,

    /// Query parameter consulted last
    #[serde(default)]
    pub token_query_param: Option<String>,
}

impl AuthConfig {
    pub fn enabled(&self) -> bool {
        !self.domain.is_empty()
    }

    /// Issuer URL, `https://{domain}/`
    pub fn issuer_url(&self) -> String {
        format!("https://{}/", self.domain)
    }

    pub fn allowed_clock_skew(&self) -> Duration {
        Duration::from_secs(self.allowed_clock_skew_secs)
    }

    pub fn jwks_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.jwks_refresh_interval_secs)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            audiences: Vec::new(),
            algorithm: default_auth_algorithm(),
            allowed_clock_skew_secs: default_clock_skew(),
            jwks_refresh_interval_secs: default_jwks_refresh_interval(),
            token_cookie: None,
            token_query_param: None,
        }
    }
}

// ============================================================================
// Management API Configuration
// ============================================================================

/// Client credentials used to obtain management-API tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ManagementConfig {
    /// Domain of the token endpoint. Falls back to `auth.domain` when empty.
    #[serde(default)]
    pub domain: String,

    #[serde(default)]
    pub client_id: String,

    /// Keep this out of committed files (use WEBUTIL_MANAGEMENT__CLIENT_SECRET)
    #[serde(default)]
    pub client_secret: String,

    #[serde(default)]
    pub audience: String,
}

// ============================================================================
// Access Log Configuration
// ============================================================================

/// Access-log middleware behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLogConfig {
    /// Request URI that is never logged
    #[serde(default = "default_health_check_path")]
    pub health_check_path: String,

    /// Add the captured request body as `http:req:body`
    #[serde(default)]
    pub include_request_body: bool,
}

impl Default for AccessLogConfig {
    fn default() -> Self {
        Self {
            health_check_path: default_health_check_path(),
            include_request_body: false,
        }
    }
}

// ============================================================================
// Logger Settings
// ============================================================================

/// Logger configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Whether to use colored output on a terminal
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            colored: default_true(),
        }
    }
}

impl LoggerSettings {
    /// Convert LoggerSettings to LoggerConfig
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let format: LogFormat = self.format.parse().map_err(|e: crate::logger::LoggerError| {
            ConfigError::validation("logger.format".to_string(), e.to_string())
        })?;

        LoggerConfig::new(self.level, format, self.colored)
            .map_err(|e| ConfigError::validation("logger.level".to_string(), e.to_string()))
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
///
/// This structure represents the entire configuration that can be loaded
/// from TOML files and environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Application information
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// CORS policy
    #[serde(default)]
    pub cors: CorsConfig,

    /// JWT validation
    #[serde(default)]
    pub auth: AuthConfig,

    /// Management-API client credentials
    #[serde(default)]
    pub management: ManagementConfig,

    /// Access log
    #[serde(default)]
    pub access_log: AccessLogConfig,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerSettings,
}

impl Settings {
    /// Domain of the management-token endpoint.
    pub fn management_domain(&self) -> &str {
        if self.management.domain.is_empty() {
            &self.auth.domain
        } else {
            &self.management.domain
        }
    }
}
