//! CORS policy for browser clients.
//!
//! Policy:
//! - Origins come from configuration and may contain one `*` wildcard
//!   (`https://*.example.com`)
//! - A lone `*` answers with a literal `Access-Control-Allow-Origin: *` and
//!   is only accepted with `cors.disable_credentials` set
//! - Methods and headers extend a fixed default set
//! - Credentials are allowed unless `cors.disable_credentials` is set
//!
//! Wildcard patterns are matched with a predicate that echoes the request's
//! origin, so credentials stay usable alongside them.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::{ConfigError, CorsConfig};

const DEFAULT_METHODS: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
];

const DEFAULT_HEADERS: [HeaderName; 3] = [header::ORIGIN, header::CONTENT_LENGTH, header::CONTENT_TYPE];

#[derive(Debug, Clone, PartialEq, Eq)]
enum OriginPattern {
    Exact(String),
    Wildcard { prefix: String, suffix: String },
}

impl OriginPattern {
    fn parse(origin: &str) -> Self {
        match origin.split_once('*') {
            None => OriginPattern::Exact(origin.to_string()),
            Some((prefix, suffix)) => OriginPattern::Wildcard {
                prefix: prefix.to_string(),
                suffix: suffix.to_string(),
            },
        }
    }

    fn matches(&self, origin: &str) -> bool {
        match self {
            OriginPattern::Exact(expected) => expected == origin,
            OriginPattern::Wildcard { prefix, suffix } => {
                origin.len() >= prefix.len() + suffix.len()
                    && origin.starts_with(prefix.as_str())
                    && origin.ends_with(suffix.as_str())
            }
        }
    }
}

/// Builds the CORS layer described by `config`.
///
/// # Errors
/// Returns a validation error for an unparsable method or header name, or
/// for a lone `*` origin while credentials are allowed.
pub fn cors_layer(config: &CorsConfig) -> Result<CorsLayer, ConfigError> {
    let allow_origin = allow_origin(config)?;

    let mut methods = DEFAULT_METHODS.to_vec();
    for method in &config.allowed_methods {
        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes()).map_err(|_| {
            ConfigError::validation("cors.allowed_methods", format!("Invalid method '{}'.", method))
        })?;
        if !methods.contains(&method) {
            methods.push(method);
        }
    }

    let mut headers = DEFAULT_HEADERS.to_vec();
    for name in &config.allowed_headers {
        let name = header_name("cors.allowed_headers", name)?;
        if !headers.contains(&name) {
            headers.push(name);
        }
    }

    let expose = config
        .expose_headers
        .iter()
        .map(|name| header_name("cors.expose_headers", name))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(methods)
        .allow_headers(headers)
        .expose_headers(expose)
        .allow_credentials(!config.disable_credentials)
        .max_age(Duration::from_secs(config.max_age)))
}

fn allow_origin(config: &CorsConfig) -> Result<AllowOrigin, ConfigError> {
    if config.allowed_origins.iter().any(|origin| origin.trim() == "*") {
        if !config.disable_credentials {
            return Err(ConfigError::validation(
                "cors.allowed_origins",
                "Origin '*' requires cors.disable_credentials = true.",
            ));
        }
        return Ok(AllowOrigin::any());
    }

    let patterns: Vec<OriginPattern> = config
        .allowed_origins
        .iter()
        .map(|origin| OriginPattern::parse(origin.trim()))
        .collect();
    Ok(AllowOrigin::predicate(move |origin: &HeaderValue, _parts| {
        origin
            .to_str()
            .map(|origin| patterns.iter().any(|pattern| pattern.matches(origin)))
            .unwrap_or(false)
    }))
}

fn header_name(field: &str, name: &str) -> Result<HeaderName, ConfigError> {
    HeaderName::from_bytes(name.trim().to_ascii_lowercase().as_bytes())
        .map_err(|_| ConfigError::validation(field, format!("Invalid header name '{}'.", name)))
}
