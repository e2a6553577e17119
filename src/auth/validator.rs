//! Access-token validation.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::Uri;
use jiff::Timestamp;
use jsonwebtoken::{Algorithm, Validation, decode, decode_header};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use super::error::AuthError;
use super::keys::KeyResolver;

/// Default tolerance applied to `exp`, `nbf` and `iat` checks.
pub const DEFAULT_ALLOWED_CLOCK_SKEW: Duration = Duration::from_secs(60);

/// Application-specific claims carried next to the registered ones.
///
/// `validate` runs after signature and registered-claim checks pass.
pub trait CustomClaims: DeserializeOwned + Clone + Send + Sync + 'static {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Use when a token carries nothing beyond the registered claims.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NoCustomClaims {}

impl CustomClaims for NoCustomClaims {}

/// The OAuth2 `scope` claim.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScopeClaims {
    #[serde(default)]
    pub scope: String,
}

impl ScopeClaims {
    pub fn has_scope(&self, expected: &str) -> bool {
        super::has_scope(&self.scope, expected)
    }
}

impl CustomClaims for ScopeClaims {}

/// RFC 7519 registered claims.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RegisteredClaims {
    #[serde(rename = "iss", default)]
    pub issuer: Option<String>,
    #[serde(rename = "sub", default)]
    pub subject: Option<String>,
    #[serde(rename = "aud", default, deserialize_with = "one_or_many")]
    pub audience: Vec<String>,
    #[serde(rename = "exp", default)]
    pub expiry: Option<i64>,
    #[serde(rename = "nbf", default)]
    pub not_before: Option<i64>,
    #[serde(rename = "iat", default)]
    pub issued_at: Option<i64>,
    #[serde(rename = "jti", default)]
    pub id: Option<String>,
}

impl RegisteredClaims {
    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expiry.and_then(|s| Timestamp::from_second(s).ok())
    }

    pub fn issued_at_time(&self) -> Option<Timestamp> {
        self.issued_at.and_then(|s| Timestamp::from_second(s).ok())
    }
}

/// `aud` may be a single string or an array.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(aud)) => vec![aud],
        Some(OneOrMany::Many(auds)) => auds,
        None => Vec::new(),
    })
}

#[derive(Clone, Deserialize)]
struct TokenClaims<C> {
    #[serde(flatten)]
    registered: RegisteredClaims,
    #[serde(flatten)]
    custom: C,
}

/// Claims of a token that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedClaims<C> {
    pub registered: RegisteredClaims,
    pub custom: C,
}

/// Turns a raw token into validated claims.
#[async_trait]
pub trait TokenValidator<C>: Send + Sync {
    async fn validate(&self, token: &str) -> Result<ValidatedClaims<C>, AuthError>;
}

/// Verifies signature, issuer, audience and time claims of a JWT.
pub struct JwtValidator<C> {
    resolver: Arc<dyn KeyResolver>,
    validation: Validation,
    _claims: PhantomData<fn() -> C>,
}

impl<C> fmt::Debug for JwtValidator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtValidator")
            .field("algorithms", &self.validation.algorithms)
            .field("issuer", &self.validation.iss)
            .field("audience", &self.validation.aud)
            .field("leeway", &self.validation.leeway)
            .finish()
    }
}

impl<C: CustomClaims> JwtValidator<C> {
    /// # Errors
    /// Returns [`AuthError::Configuration`] for an empty audience list or an
    /// issuer that is not an absolute URL.
    pub fn new(
        resolver: Arc<dyn KeyResolver>,
        algorithm: Algorithm,
        issuer_url: &str,
        audiences: &[String],
    ) -> Result<Self, AuthError> {
        if audiences.is_empty() {
            return Err(AuthError::configuration("at least one audience is required"));
        }

        let issuer: Uri = issuer_url
            .parse()
            .map_err(|e| AuthError::configuration(format!("invalid issuer URL '{}': {}", issuer_url, e)))?;
        if issuer.scheme().is_none() || issuer.authority().is_none() {
            return Err(AuthError::configuration(format!(
                "issuer URL '{}' must be absolute",
                issuer_url
            )));
        }

        let mut validation = Validation::new(algorithm);
        validation.leeway = DEFAULT_ALLOWED_CLOCK_SKEW.as_secs();
        validation.set_issuer(&[issuer_url]);
        validation.set_audience(audiences);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        Ok(Self {
            resolver,
            validation,
            _claims: PhantomData,
        })
    }

    pub fn with_allowed_clock_skew(mut self, skew: Duration) -> Self {
        self.validation.leeway = skew.as_secs();
        self
    }
}

#[async_trait]
impl<C: CustomClaims> TokenValidator<C> for JwtValidator<C> {
    async fn validate(&self, token: &str) -> Result<ValidatedClaims<C>, AuthError> {
        let header = decode_header(token)?;
        let key = self.resolver.resolve(&header).await?;
        let data = decode::<TokenClaims<C>>(token, &key, &self.validation)?;

        let TokenClaims { registered, custom } = data.claims;
        custom.validate().map_err(AuthError::CustomClaims)?;

        Ok(ValidatedClaims { registered, custom })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::keys::StaticKeyResolver;
    use jsonwebtoken::{DecodingKey, EncodingKey, Header, encode};

    pub(crate) const SECRET: &[u8] = b"validator-test-secret-32-bytes-long!";
    pub(crate) const ISSUER: &str = "https://tenant.example.com/";
    pub(crate) const AUDIENCE: &str = "https://api.example.com";

    pub(crate) fn sign(claims: &serde_json::Value) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    pub(crate) fn claims_expiring_in(seconds: i64) -> serde_json::Value {
        let now = Timestamp::now().as_second();
        serde_json::json!({
            "iss": ISSUER,
            "sub": "auth0|user-1",
            "aud": [AUDIENCE, "https://tenant.example.com/userinfo"],
            "iat": now,
            "exp": now + seconds,
            "scope": "read:messages write:messages",
        })
    }

    pub(crate) fn hs256_validator<C: CustomClaims>() -> JwtValidator<C> {
        JwtValidator::new(
            Arc::new(StaticKeyResolver::new(DecodingKey::from_secret(SECRET))),
            Algorithm::HS256,
            ISSUER,
            &[AUDIENCE.to_string()],
        )
        .unwrap()
    }

    #[derive(Debug, Clone, Deserialize)]
    struct TenantClaims {
        tenant: String,
    }

    impl CustomClaims for TenantClaims {
        fn validate(&self) -> Result<(), String> {
            if self.tenant == "acme" {
                Ok(())
            } else {
                Err(format!("unknown tenant {}", self.tenant))
            }
        }
    }

    #[tokio::test]
    async fn test_valid_token() {
        let validator = hs256_validator::<ScopeClaims>();
        let claims = validator.validate(&sign(&claims_expiring_in(300))).await.unwrap();

        assert_eq!(claims.registered.subject.as_deref(), Some("auth0|user-1"));
        assert_eq!(claims.registered.issuer.as_deref(), Some(ISSUER));
        assert!(claims.registered.audience.contains(&AUDIENCE.to_string()));
        assert!(claims.registered.expires_at().is_some());
        assert!(claims.custom.has_scope("write:messages"));
        assert!(!claims.custom.has_scope("messages"));
    }

    #[tokio::test]
    async fn test_single_string_audience() {
        let mut payload = claims_expiring_in(300);
        payload["aud"] = serde_json::json!(AUDIENCE);

        let claims = hs256_validator::<NoCustomClaims>()
            .validate(&sign(&payload))
            .await
            .unwrap();

        assert_eq!(claims.registered.audience, vec![AUDIENCE.to_string()]);
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let result = hs256_validator::<NoCustomClaims>()
            .validate(&sign(&claims_expiring_in(-3600)))
            .await;
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_expiry_within_clock_skew_accepted() {
        let result = hs256_validator::<NoCustomClaims>()
            .validate(&sign(&claims_expiring_in(-10)))
            .await;
        assert!(result.is_ok());

        let strict = hs256_validator::<NoCustomClaims>().with_allowed_clock_skew(Duration::ZERO);
        assert!(strict.validate(&sign(&claims_expiring_in(-10))).await.is_err());
    }

    #[tokio::test]
    async fn test_wrong_audience_rejected() {
        let mut payload = claims_expiring_in(300);
        payload["aud"] = serde_json::json!("https://other.example.com");

        let result = hs256_validator::<NoCustomClaims>().validate(&sign(&payload)).await;
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_wrong_issuer_rejected() {
        let mut payload = claims_expiring_in(300);
        payload["iss"] = serde_json::json!("https://evil.example.com/");

        let result = hs256_validator::<NoCustomClaims>().validate(&sign(&payload)).await;
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_bad_signature_rejected() {
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims_expiring_in(300),
            &EncodingKey::from_secret(b"some-other-secret-also-32-bytes-long"),
        )
        .unwrap();

        let result = hs256_validator::<NoCustomClaims>().validate(&token).await;
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let result = hs256_validator::<NoCustomClaims>().validate("not-a-jwt").await;
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_custom_claims_validation() {
        let validator = hs256_validator::<TenantClaims>();

        let mut payload = claims_expiring_in(300);
        payload["tenant"] = serde_json::json!("acme");
        let claims = validator.validate(&sign(&payload)).await.unwrap();
        assert_eq!(claims.custom.tenant, "acme");

        payload["tenant"] = serde_json::json!("globex");
        let result = validator.validate(&sign(&payload)).await;
        assert!(matches!(result, Err(AuthError::CustomClaims(_))));
    }

    #[test]
    fn test_construction_errors() {
        let resolver: Arc<dyn KeyResolver> =
            Arc::new(StaticKeyResolver::new(DecodingKey::from_secret(SECRET)));

        let no_audience = JwtValidator::<NoCustomClaims>::new(resolver.clone(), Algorithm::HS256, ISSUER, &[]);
        assert!(matches!(no_audience, Err(ref e) if e.is_configuration()));

        let relative = JwtValidator::<NoCustomClaims>::new(
            resolver,
            Algorithm::HS256,
            "tenant.example.com",
            &[AUDIENCE.to_string()],
        );
        assert!(matches!(relative, Err(ref e) if e.is_configuration()));
    }
}
