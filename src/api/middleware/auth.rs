//! JWT authentication middleware.
//!
//! [`JwtAuth`] bundles a token extractor and a validator. Applied to a
//! router, it rejects requests without a valid token with 401 before any
//! handler runs, and hands validated claims to handlers through
//! [`Claims`](crate::auth::Claims).

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use jsonwebtoken::Algorithm;

use crate::auth::{
    AuthError, AuthHeaderTokenExtractor, CachingJwksProvider, CookieTokenExtractor, CustomClaims,
    JwtValidator, MultiTokenExtractor, ParameterTokenExtractor, TokenExtractor, TokenValidator,
    insert_claims,
};
use crate::config::AuthConfig;
use crate::error::AppError;

/// Authentication layer for routers whose handlers expect `Claims<C>`.
pub struct JwtAuth<C> {
    validator: Arc<dyn TokenValidator<C>>,
    extractor: Arc<dyn TokenExtractor>,
}

impl<C> Clone for JwtAuth<C> {
    fn clone(&self) -> Self {
        Self {
            validator: Arc::clone(&self.validator),
            extractor: Arc::clone(&self.extractor),
        }
    }
}

impl<C> std::fmt::Debug for JwtAuth<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuth").finish_non_exhaustive()
    }
}

impl<C> JwtAuth<C>
where
    C: Send + Sync + 'static,
{
    pub fn new(validator: Arc<dyn TokenValidator<C>>, extractor: Arc<dyn TokenExtractor>) -> Self {
        Self { validator, extractor }
    }

    /// Protects every route currently registered on `router`.
    ///
    /// Routes added after this call are not protected, and unmatched paths
    /// still fall through to the router's 404.
    pub fn apply<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.route_layer(middleware::from_fn_with_state(self, jwt_auth_middleware::<C>))
    }

    async fn authenticate(&self, request: &mut Request) -> Result<(), AuthError> {
        let (parts, body) = std::mem::take(request).into_parts();
        let token = self.extractor.extract(&parts);
        *request = Request::from_parts(parts, body);

        let token = token?.ok_or(AuthError::MissingToken)?;
        let claims = self.validator.validate(&token).await?;
        insert_claims(request.extensions_mut(), Arc::new(claims));
        Ok(())
    }
}

/// Middleware that validates the request's token.
///
/// # Errors
/// Responds 401 Unauthorized, without calling the next handler, if:
/// - No configured source carries a token
/// - A source is present but malformed
/// - The token fails signature, issuer, audience or expiry checks
///
/// The underlying [`AuthError`] travels on the response so the access log
/// records why the request was rejected.
pub async fn jwt_auth_middleware<C>(
    State(auth): State<JwtAuth<C>>,
    mut request: Request,
    next: Next,
) -> Response
where
    C: Send + Sync + 'static,
{
    match auth.authenticate(&mut request).await {
        Ok(()) => next.run(request).await,
        Err(err) => {
            tracing::debug!(error = %err, "Rejected request with invalid credentials");
            AppError::Unauthorized {
                message: "failed to validate JWT".to_string(),
                source: Some(err.into()),
            }
            .into_response()
        }
    }
}

/// Builds the authentication layer and its key-set provider from settings.
///
/// Tokens are read from the `Authorization` header, then from the configured
/// cookie and query parameter. The caller owns the provider and decides
/// whether to run [`CachingJwksProvider::spawn_refresh`].
///
/// # Errors
/// Returns [`AuthError::Configuration`] when auth is disabled or the settings
/// cannot produce a validator.
pub fn create_jwt_auth<C: CustomClaims>(
    config: &AuthConfig,
) -> Result<(JwtAuth<C>, Arc<CachingJwksProvider>), AuthError> {
    if !config.enabled() {
        return Err(AuthError::configuration("auth.domain is not set"));
    }

    let algorithm: Algorithm = config
        .algorithm
        .parse()
        .map_err(|_| AuthError::configuration(format!("unsupported algorithm '{}'", config.algorithm)))?;
    let issuer_url = config.issuer_url();

    let provider = Arc::new(CachingJwksProvider::new(
        &issuer_url,
        config.jwks_refresh_interval(),
    ));
    let validator = JwtValidator::<C>::new(provider.clone(), algorithm, &issuer_url, &config.audiences)?
        .with_allowed_clock_skew(config.allowed_clock_skew());

    let mut extractors: Vec<Box<dyn TokenExtractor>> = vec![Box::new(AuthHeaderTokenExtractor)];
    if let Some(cookie) = &config.token_cookie {
        extractors.push(Box::new(CookieTokenExtractor::new(cookie.as_str())));
    }
    if let Some(param) = &config.token_query_param {
        extractors.push(Box::new(ParameterTokenExtractor::new(param.as_str())));
    }

    let auth = JwtAuth::new(
        Arc::new(validator),
        Arc::new(MultiTokenExtractor::new(extractors)),
    );
    Ok((auth, provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::validator::tests::{claims_expiring_in, hs256_validator, sign, AUDIENCE, ISSUER};
    use crate::auth::{Claims, ScopeClaims};
    use axum::{body::Body, http::StatusCode, routing::get};
    use http_body_util::BodyExt;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn protected_app(reached: Arc<AtomicBool>) -> Router {
        let auth = JwtAuth::<ScopeClaims>::new(
            Arc::new(hs256_validator::<ScopeClaims>()),
            Arc::new(MultiTokenExtractor::default()),
        );
        let router = Router::new().route(
            "/api/private",
            get(move |Claims(claims): Claims<ScopeClaims>| {
                let reached = reached.clone();
                async move {
                    reached.store(true, Ordering::SeqCst);
                    format!(
                        "{}|{}|{}",
                        claims.registered.subject.clone().unwrap_or_default(),
                        claims.registered.issuer.clone().unwrap_or_default(),
                        claims.registered.audience.join(",")
                    )
                }
            }),
        );
        auth.apply(router)
    }

    fn request(authorization: Option<String>) -> Request {
        let mut builder = Request::builder().uri("/api/private");
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler_with_claims() {
        let reached = Arc::new(AtomicBool::new(false));
        let token = sign(&claims_expiring_in(300));

        let response = protected_app(reached.clone())
            .oneshot(request(Some(format!("Bearer {token}"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(reached.load(Ordering::SeqCst));
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.starts_with(&format!("auth0|user-1|{ISSUER}|")));
        assert!(body.contains(AUDIENCE));
    }

    async fn assert_rejected(authorization: Option<String>) {
        let reached = Arc::new(AtomicBool::new(false));

        let response = protected_app(reached.clone())
            .oneshot(request(authorization))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(!reached.load(Ordering::SeqCst));
        assert!(response.extensions().get::<crate::access_log::RecordedErrors>().is_some());
    }

    #[tokio::test]
    async fn test_missing_token_rejected() {
        assert_rejected(None).await;
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let token = sign(&claims_expiring_in(-3600));
        assert_rejected(Some(format!("Bearer {token}"))).await;
    }

    #[tokio::test]
    async fn test_wrong_audience_rejected() {
        let mut payload = claims_expiring_in(300);
        payload["aud"] = serde_json::json!("https://someone-else.example.com");
        assert_rejected(Some(format!("Bearer {}", sign(&payload)))).await;
    }

    #[tokio::test]
    async fn test_malformed_authorization_rejected() {
        let token = sign(&claims_expiring_in(300));
        assert_rejected(Some(format!("Token {token}"))).await;
        assert_rejected(Some("Bearer".to_string())).await;
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_authenticated() {
        let response = protected_app(Arc::new(AtomicBool::new(false)))
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_create_jwt_auth_from_settings() {
        let config = AuthConfig {
            domain: "tenant.example.com".to_string(),
            audiences: vec![AUDIENCE.to_string()],
            token_cookie: Some("access_token".to_string()),
            ..Default::default()
        };

        let (_, provider) = create_jwt_auth::<ScopeClaims>(&config).unwrap();
        assert_eq!(
            provider.jwks_url(),
            "https://tenant.example.com/.well-known/jwks.json"
        );
    }

    #[test]
    fn test_create_jwt_auth_rejects_bad_settings() {
        let disabled = AuthConfig::default();
        assert!(create_jwt_auth::<ScopeClaims>(&disabled).is_err());

        let no_audience = AuthConfig {
            domain: "tenant.example.com".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            create_jwt_auth::<ScopeClaims>(&no_audience),
            Err(ref e) if e.is_configuration()
        ));

        let bad_algorithm = AuthConfig {
            domain: "tenant.example.com".to_string(),
            audiences: vec![AUDIENCE.to_string()],
            algorithm: "XX999".to_string(),
            ..Default::default()
        };
        assert!(create_jwt_auth::<ScopeClaims>(&bad_algorithm).is_err());
    }
}
