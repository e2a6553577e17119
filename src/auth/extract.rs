//! Token extraction strategies.
//!
//! An extractor looks at the request head and returns `Ok(None)` when its
//! source is absent, `Ok(Some(token))` when it found one and an error when
//! the source is present but unusable.

use std::collections::HashMap;

use axum::extract::Query;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;

use super::error::AuthError;

/// Strategy for pulling a raw token out of a request.
pub trait TokenExtractor: Send + Sync {
    fn extract(&self, parts: &Parts) -> Result<Option<String>, AuthError>;
}

/// Reads `Authorization: Bearer <token>`. The scheme is case-insensitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthHeaderTokenExtractor;

impl TokenExtractor for AuthHeaderTokenExtractor {
    fn extract(&self, parts: &Parts) -> Result<Option<String>, AuthError> {
        let Some(value) = parts.headers.get(AUTHORIZATION) else {
            return Ok(None);
        };
        let value = value.to_str().map_err(|_| {
            AuthError::MalformedToken("authorization header is not valid ASCII".to_string())
        })?;

        let mut fields = value.split_whitespace();
        match (fields.next(), fields.next(), fields.next()) {
            (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => {
                Ok(Some(token.to_string()))
            }
            _ => Err(AuthError::MalformedToken(
                "authorization header format must be Bearer {token}".to_string(),
            )),
        }
    }
}

/// Reads the token from a named cookie.
#[derive(Debug, Clone)]
pub struct CookieTokenExtractor {
    name: String,
}

impl CookieTokenExtractor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl TokenExtractor for CookieTokenExtractor {
    fn extract(&self, parts: &Parts) -> Result<Option<String>, AuthError> {
        let token = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .map(|(_, value)| value.trim_matches('"').to_string());
        Ok(token)
    }
}

/// Reads the token from a query-string parameter.
#[derive(Debug, Clone)]
pub struct ParameterTokenExtractor {
    param: String,
}

impl ParameterTokenExtractor {
    pub fn new(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
        }
    }
}

impl TokenExtractor for ParameterTokenExtractor {
    fn extract(&self, parts: &Parts) -> Result<Option<String>, AuthError> {
        if parts.uri.query().is_none() {
            return Ok(None);
        }
        let Query(mut params) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map_err(|e| AuthError::MalformedToken(format!("unreadable query string: {}", e)))?;
        Ok(params.remove(&self.param))
    }
}

/// Tries each extractor in order.
///
/// The first non-empty token wins; the first error aborts.
pub struct MultiTokenExtractor {
    extractors: Vec<Box<dyn TokenExtractor>>,
}

impl MultiTokenExtractor {
    pub fn new(extractors: Vec<Box<dyn TokenExtractor>>) -> Self {
        Self { extractors }
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl Default for MultiTokenExtractor {
    fn default() -> Self {
        Self::new(vec![Box::new(AuthHeaderTokenExtractor)])
    }
}

impl TokenExtractor for MultiTokenExtractor {
    fn extract(&self, parts: &Parts) -> Result<Option<String>, AuthError> {
        for extractor in &self.extractors {
            match extractor.extract(parts)? {
                Some(token) if !token.is_empty() => return Ok(Some(token)),
                _ => continue,
            }
        }
        Ok(None)
    }
}
