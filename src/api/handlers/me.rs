//! Current caller (me) endpoints.
//!
//! Provides endpoints for an authenticated caller to inspect their token.

use axum::{Json, Router, extract::Path, routing::get};

use crate::access_log::RequestLogger;
use crate::api::dto::{MeResponse, ScopeCheckResponse};
use crate::auth::{Claims, ScopeClaims};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Creates the "me" routes
///
/// # Routes
/// - `GET /me` - Summary of the caller's claims
/// - `GET /me/scopes/{scope}` - 200 if the caller holds `scope`, else 403
///
/// # Authentication
/// Both routes need claims; wrap them with [`JwtAuth::apply`](crate::api::middleware::JwtAuth::apply).
pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/me/scopes/{scope}", get(check_scope))
}

/// GET /api/me - Summary of the caller's validated token
async fn get_me(logger: RequestLogger, Claims(claims): Claims<ScopeClaims>) -> Json<MeResponse> {
    if let Some(subject) = &claims.registered.subject {
        logger.str("auth:subject", subject.as_str());
    }
    Json(MeResponse::from(&*claims))
}

/// GET /api/me/scopes/{scope} - Checks a single scope
async fn check_scope(
    Claims(claims): Claims<ScopeClaims>,
    Path(scope): Path<String>,
) -> AppResult<Json<ScopeCheckResponse>> {
    if !claims.custom.has_scope(&scope) {
        return Err(AppError::forbidden(format!("missing scope {}", scope)));
    }
    Ok(Json(ScopeCheckResponse {
        scope,
        granted: true,
    }))
}
