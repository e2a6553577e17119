//! Configuration validation logic
//!
//! This module provides validation methods for all configuration structures
//! to ensure configuration values are within acceptable ranges and formats.

use std::str::FromStr;

use axum::http::uri::Authority;
use axum::http::{HeaderName, HeaderValue, Method};
use jsonwebtoken::Algorithm;

use crate::config::error::ConfigError;
use crate::config::settings::{
    AccessLogConfig, AuthConfig, CorsConfig, LoggerSettings, ServerConfig, Settings,
};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

impl ServerConfig {
    /// Validate server configuration
    ///
    /// # Validation Rules
    /// - Port must be between 1 and 65535
    /// - Host must not be empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.host.trim().is_empty() {
            return Err(ConfigError::validation(
                "server.host",
                "Host is required.",
            ));
        }

        Ok(())
    }
}

impl CorsConfig {
    /// Validate CORS configuration
    ///
    /// # Validation Rules
    /// - At least one allowed origin
    /// - Every origin is a valid header value with at most one `*`
    /// - A lone `*` only when credentials are disabled
    /// - Extra methods and headers are valid tokens
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_origins.is_empty() {
            return Err(ConfigError::validation(
                "cors.allowed_origins",
                "At least one allowed origin is required.",
            ));
        }

        for origin in &self.allowed_origins {
            if HeaderValue::from_str(origin).is_err() || origin.trim().is_empty() {
                return Err(ConfigError::validation(
                    "cors.allowed_origins",
                    format!("Invalid origin '{}'.", origin),
                ));
            }
            if origin.matches('*').count() > 1 {
                return Err(ConfigError::validation(
                    "cors.allowed_origins",
                    format!("Origin '{}' may contain at most one '*' wildcard.", origin),
                ));
            }
            if origin.trim() == "*" && !self.disable_credentials {
                return Err(ConfigError::validation(
                    "cors.allowed_origins",
                    "Origin '*' requires cors.disable_credentials = true.",
                ));
            }
        }

        for method in &self.allowed_methods {
            if Method::from_bytes(method.as_bytes()).is_err() {
                return Err(ConfigError::validation(
                    "cors.allowed_methods",
                    format!("Invalid method '{}'.", method),
                ));
            }
        }

        for header in self.allowed_headers.iter().chain(&self.expose_headers) {
            if HeaderName::from_bytes(header.as_bytes()).is_err() {
                return Err(ConfigError::validation(
                    "cors.allowed_headers",
                    format!("Invalid header name '{}'.", header),
                ));
            }
        }

        Ok(())
    }
}

impl AuthConfig {
    /// Validate auth configuration
    ///
    /// Nothing is checked while auth is disabled (empty domain).
    ///
    /// # Validation Rules
    /// - Domain is a bare host[:port]
    /// - At least one audience
    /// - Algorithm is a known JWS algorithm
    /// - Refresh interval is greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled() {
            return Ok(());
        }

        if self.domain.contains('/') || Authority::from_str(&self.domain).is_err() {
            return Err(ConfigError::validation(
                "auth.domain",
                format!(
                    "Invalid domain '{}'. Expected a host such as 'tenant.eu.auth0.com'.",
                    self.domain
                ),
            ));
        }

        if self.audiences.is_empty() {
            return Err(ConfigError::validation(
                "auth.audiences",
                "At least one audience is required when auth is enabled.",
            ));
        }

        if Algorithm::from_str(&self.algorithm).is_err() {
            return Err(ConfigError::validation(
                "auth.algorithm",
                format!("Unknown signature algorithm '{}'.", self.algorithm),
            ));
        }

        if self.jwks_refresh_interval_secs == 0 {
            return Err(ConfigError::validation(
                "auth.jwks_refresh_interval_secs",
                "Key-set refresh interval must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl AccessLogConfig {
    /// Validate access-log configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.health_check_path.starts_with('/') {
            return Err(ConfigError::validation(
                "access_log.health_check_path",
                format!(
                    "Health-check path '{}' must start with '/'.",
                    self.health_check_path
                ),
            ));
        }
        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error
    /// - Log format must be one of: full, compact, json
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// This method validates all sub-configurations and returns the first
    /// validation error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.cors.validate()?;
        self.auth.validate()?;
        self.access_log.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_cors() -> CorsConfig {
        CorsConfig {
            allowed_origins: vec!["https://app.example.com".to_string()],
            ..Default::default()
        }
    }

    fn valid_auth() -> AuthConfig {
        AuthConfig {
            domain: "tenant.example.com".to_string(),
            audiences: vec!["https://api.example.com".to_string()],
            ..Default::default()
        }
    }

    // ========================================================================
    // ServerConfig validation tests
    // ========================================================================

    #[test]
    fn test_server_config_valid() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_server_config_invalid_port_zero() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "server.port")
        );
    }

    // ========================================================================
    // CorsConfig validation tests
    // ========================================================================

    #[test]
    fn test_cors_requires_origins() {
        let err = CorsConfig::default().validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "cors.allowed_origins")
        );
    }

    #[test]
    fn test_cors_accepts_single_wildcard() {
        let config = CorsConfig {
            allowed_origins: vec!["https://*.example.com".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cors_any_origin_needs_credentials_disabled() {
        let config = CorsConfig {
            allowed_origins: vec!["*".to_string()],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("disable_credentials"));

        let config = CorsConfig {
            disable_credentials: true,
            ..config
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cors_rejects_double_wildcard() {
        let config = CorsConfig {
            allowed_origins: vec!["https://*.*.example.com".to_string()],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at most one"));
    }

    #[test]
    fn test_cors_rejects_bad_header_and_method() {
        let config = CorsConfig {
            allowed_headers: vec!["bad header".to_string()],
            ..valid_cors()
        };
        assert!(config.validate().is_err());

        let config = CorsConfig {
            allowed_methods: vec!["GE T".to_string()],
            ..valid_cors()
        };
        assert!(config.validate().is_err());
    }

    // ========================================================================
    // AuthConfig validation tests
    // ========================================================================

    #[test]
    fn test_auth_disabled_skips_checks() {
        assert!(AuthConfig::default().validate().is_ok());
    }

    #[test]
    fn test_auth_valid() {
        assert!(valid_auth().validate().is_ok());
    }

    #[test]
    fn test_auth_requires_audience() {
        let config = AuthConfig {
            audiences: Vec::new(),
            ..valid_auth()
        };
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "auth.audiences")
        );
    }

    #[test]
    fn test_auth_rejects_url_as_domain() {
        let config = AuthConfig {
            domain: "https://tenant.example.com/".to_string(),
            ..valid_auth()
        };
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "auth.domain")
        );
    }

    #[test]
    fn test_auth_rejects_unknown_algorithm() {
        let config = AuthConfig {
            algorithm: "XS512".to_string(),
            ..valid_auth()
        };
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "auth.algorithm")
        );
    }

    #[test]
    fn test_auth_rejects_zero_refresh_interval() {
        let config = AuthConfig {
            jwks_refresh_interval_secs: 0,
            ..valid_auth()
        };
        assert!(config.validate().is_err());
    }

    // ========================================================================
    // LoggerSettings validation tests
    // ========================================================================

    #[test]
    fn test_logger_settings_valid_levels() {
        for level in ["trace", "debug", "info", "warn", "error", "INFO", "Debug"] {
            let settings = LoggerSettings {
                level: level.to_string(),
                ..Default::default()
            };
            assert!(settings.validate().is_ok(), "Level should be valid: {}", level);
        }
    }

    #[test]
    fn test_logger_settings_invalid_format() {
        let settings = LoggerSettings {
            format: "invalid".to_string(),
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "logger.format")
        );
    }

    // ========================================================================
    // Settings validation tests
    // ========================================================================

    #[test]
    fn test_settings_valid() {
        let settings = Settings {
            cors: valid_cors(),
            auth: valid_auth(),
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_default_needs_origins() {
        let err = Settings::default().validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "cors.allowed_origins")
        );
    }

    #[test]
    fn test_settings_invalid_access_log_path() {
        let settings = Settings {
            cors: valid_cors(),
            access_log: AccessLogConfig {
                health_check_path: "healthz".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "access_log.health_check_path")
        );
    }
}
