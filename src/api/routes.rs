//! Router configuration for the API.
//!
//! This module provides centralized route registration and middleware
//! configuration for the application.

use axum::{Router, middleware};

use crate::api::handlers;
use crate::api::middleware::{access_log_middleware, cors_layer, request_id_middleware};
use crate::config::ConfigError;
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Middleware is applied in reverse order of declaration (last added runs first):
/// 1. Request ID middleware (runs first) - generates/propagates request IDs
/// 2. Access log middleware - records one line per request, with its ID
/// 3. CORS - answers preflights, so they are access-logged too
///
/// # Routes
/// - `GET {health_check_path}` - Health check, never access-logged
/// - `GET /api/me`, `GET /api/me/scopes/{scope}` - Behind JWT auth when configured
/// - `POST /api/echo` - Echoes the request body
///
/// # Errors
/// Returns a validation error when the CORS settings cannot be turned into a layer.
///
/// # Example
/// ```ignore
/// let state = AppState::new(settings);
/// let router = create_router(state)?;
/// ```
pub fn create_router(state: AppState) -> Result<Router, ConfigError> {
    let cors = cors_layer(&state.settings.cors)?;

    let me_routes = match &state.auth {
        Some(auth) => auth.clone().apply(handlers::me::me_routes()),
        None => handlers::me::me_routes(),
    };
    let api_routes = Router::new()
        .merge(me_routes)
        .merge(handlers::echo::echo_routes());

    Ok(Router::new()
        .merge(handlers::health::health_routes(
            state.access_log.health_check_path(),
        ))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(middleware::from_fn_with_state(
            state.access_log.clone(),
            access_log_middleware,
        ))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state))
}
