//! Request-scoped storage for validated claims.
//!
//! The auth middleware stores claims under a single extension slot,
//! whatever their custom-claims type. Reading them back with a different
//! type means the validator and the handler disagree about the contract,
//! which is a wiring bug and panics.

use std::any::{Any, type_name};
use std::ops::Deref;
use std::sync::Arc;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::Extensions;
use axum::http::request::Parts;

use super::validator::ValidatedClaims;
use crate::error::AppError;

#[derive(Clone)]
struct ClaimsSlot {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

/// Stores `claims` for downstream handlers, replacing any previous value.
pub fn insert_claims<C>(extensions: &mut Extensions, claims: Arc<ValidatedClaims<C>>)
where
    C: Send + Sync + 'static,
{
    extensions.insert(ClaimsSlot {
        value: claims,
        type_name: type_name::<ValidatedClaims<C>>(),
    });
}

/// Returns the stored claims, or `None` when the request was not authenticated.
///
/// # Panics
/// When the stored claims were produced for a different custom-claims type.
pub fn get_claims<C>(extensions: &Extensions) -> Option<Arc<ValidatedClaims<C>>>
where
    C: Send + Sync + 'static,
{
    let slot = extensions.get::<ClaimsSlot>()?;
    match Arc::clone(&slot.value).downcast::<ValidatedClaims<C>>() {
        Ok(claims) => Some(claims),
        Err(_) => panic!(
            "unexpected claims type '{}', expected '{}'",
            slot.type_name,
            type_name::<ValidatedClaims<C>>()
        ),
    }
}

/// Extractor for the claims of an authenticated request.
///
/// Rejects with 401 when no claims are present; use `Option<Claims<C>>`
/// on routes where authentication is optional.
#[derive(Debug, Clone)]
pub struct Claims<C>(pub Arc<ValidatedClaims<C>>);

impl<C> Deref for Claims<C> {
    type Target = ValidatedClaims<C>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, C> FromRequestParts<S> for Claims<C>
where
    S: Send + Sync,
    C: Send + Sync + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        get_claims::<C>(&parts.extensions)
            .map(Claims)
            .ok_or_else(|| AppError::unauthorized("authentication required"))
    }
}

impl<S, C> OptionalFromRequestParts<S> for Claims<C>
where
    S: Send + Sync,
    C: Send + Sync + 'static,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(get_claims::<C>(&parts.extensions).map(Claims))
    }
}
