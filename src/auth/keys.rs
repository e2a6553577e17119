//! Signing-key resolution.
//!
//! [`CachingJwksProvider`] keeps the identity provider's key set in memory.
//! Request-path lookups only take a read lock; the set is replaced when it
//! goes stale, when a token names an unknown `kid`, or by the background
//! task started with [`CachingJwksProvider::spawn_refresh`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{DecodingKey, Header};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::error::AuthError;
use crate::external::client::HTTP_CLIENT;

/// Default interval between key-set refreshes.
pub const DEFAULT_JWKS_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Unknown key ids never trigger fetches closer together than this.
const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(10);

/// Path of the key set relative to the issuer URL.
const JWKS_PATH: &str = ".well-known/jwks.json";

/// Maps a token header to the key that verifies it.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    async fn resolve(&self, header: &Header) -> Result<DecodingKey, AuthError>;
}

/// Always returns the same key, whatever the header says.
#[derive(Clone)]
pub struct StaticKeyResolver {
    key: DecodingKey,
}

impl StaticKeyResolver {
    pub fn new(key: DecodingKey) -> Self {
        Self { key }
    }
}

#[async_trait]
impl KeyResolver for StaticKeyResolver {
    async fn resolve(&self, _header: &Header) -> Result<DecodingKey, AuthError> {
        Ok(self.key.clone())
    }
}

struct CachedKeySet {
    keys: JwkSet,
    fetched_at: Instant,
}

/// JWKS fetcher with an in-memory cache.
pub struct CachingJwksProvider {
    jwks_url: String,
    refresh_interval: Duration,
    client: reqwest::Client,
    cache: RwLock<Option<CachedKeySet>>,
}

impl CachingJwksProvider {
    /// Provider for `{issuer_url}.well-known/jwks.json`.
    pub fn new(issuer_url: &str, refresh_interval: Duration) -> Self {
        let base = if issuer_url.ends_with('/') {
            issuer_url.to_string()
        } else {
            format!("{}/", issuer_url)
        };
        Self {
            jwks_url: format!("{}{}", base, JWKS_PATH),
            refresh_interval,
            client: HTTP_CLIENT.clone(),
            cache: RwLock::new(None),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Fetches the key set and replaces the cached copy.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let keys = self.fetch().await?;
        tracing::debug!(url = %self.jwks_url, keys = keys.keys.len(), "Refreshed JWKS");
        *self.cache.write().await = Some(CachedKeySet {
            keys,
            fetched_at: Instant::now(),
        });
        Ok(())
    }

    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        let key_set_error = |source: reqwest::Error| AuthError::KeySet {
            url: self.jwks_url.clone(),
            source: source.into(),
        };

        self.client
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(key_set_error)?
            .json::<JwkSet>()
            .await
            .map_err(key_set_error)
    }

    /// Runs [`refresh`](Self::refresh) on a fixed interval until the handle is aborted.
    ///
    /// The first refresh happens immediately. Failures are logged and the
    /// previous key set stays in place.
    pub fn spawn_refresh(self: &Arc<Self>) -> JoinHandle<()> {
        let provider = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(provider.refresh_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if let Err(e) = provider.refresh().await {
                    tracing::warn!(error = %e, url = %provider.jwks_url, "JWKS refresh failed");
                }
            }
        })
    }

    /// Looks `kid` up in the cache.
    ///
    /// Returns the key (if any) and whether the cache wants a refetch.
    async fn lookup(&self, kid: &str) -> (Option<DecodingKey>, bool) {
        let cache = self.cache.read().await;
        let Some(cached) = cache.as_ref() else {
            return (None, true);
        };

        let age = cached.fetched_at.elapsed();
        match cached.keys.find(kid) {
            Some(jwk) => (
                DecodingKey::from_jwk(jwk).ok(),
                age >= self.refresh_interval,
            ),
            None => (None, age >= MIN_REFETCH_INTERVAL),
        }
    }
}

#[async_trait]
impl KeyResolver for CachingJwksProvider {
    async fn resolve(&self, header: &Header) -> Result<DecodingKey, AuthError> {
        let kid = header.kid.as_deref().ok_or(AuthError::MissingKeyId)?;

        let (cached_key, wants_refresh) = self.lookup(kid).await;
        if !wants_refresh {
            return cached_key.ok_or_else(|| AuthError::UnknownKey(kid.to_string()));
        }

        if let Err(e) = self.refresh().await {
            // A stale key is still better than failing every request.
            return match cached_key {
                Some(key) => {
                    tracing::warn!(error = %e, "Serving stale JWKS after refresh failure");
                    Ok(key)
                }
                None => Err(e),
            };
        }

        let cache = self.cache.read().await;
        let jwk = cache
            .as_ref()
            .and_then(|cached| cached.keys.find(kid))
            .ok_or_else(|| AuthError::UnknownKey(kid.to_string()))?;
        Ok(DecodingKey::from_jwk(jwk)?)
    }
}
