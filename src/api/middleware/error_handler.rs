//! Error handler for converting AppError to HTTP responses.
//!
//! This module implements the IntoResponse trait for AppError, providing
//! consistent error response formatting. The error is attached to the
//! response as a [`RecordedError`] so the access log can escalate severity.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::access_log::{RecordedError, RecordedErrors};
use crate::api::dto::ErrorResponse;
use crate::error::AppError;

impl IntoResponse for AppError {
    /// Converts an AppError into an HTTP response.
    ///
    /// # Status Code Mapping
    /// - NotFound → 404 NOT_FOUND
    /// - BadRequest → 400 BAD_REQUEST
    /// - Unauthorized → 401 UNAUTHORIZED
    /// - Forbidden → 403 FORBIDDEN
    /// - Configuration → 500 INTERNAL_SERVER_ERROR
    /// - Upstream → 502 BAD_GATEWAY
    /// - Internal → 500 INTERNAL_SERVER_ERROR
    fn into_response(self) -> Response {
        let status = error_to_status_code(&self);
        let code = error_to_code(&self);

        let error_response = match &self {
            AppError::NotFound { resource } => {
                ErrorResponse::new(code, &format!("Resource not found: {}", resource))
            }
            AppError::BadRequest { message }
            | AppError::Unauthorized { message, .. }
            | AppError::Forbidden { message } => ErrorResponse::new(code, message),
            AppError::Configuration { key, .. } => {
                ErrorResponse::new(code, &format!("Configuration error: {}", key))
                    .with_details(json!({ "key": key }))
            }
            AppError::Upstream { service, .. } => {
                ErrorResponse::new(code, &format!("Upstream service failed: {}", service))
                    .with_details(json!({ "service": service }))
            }
            AppError::Internal { .. } => ErrorResponse::new(code, "An internal error occurred"),
        };

        let mut response = (status, Json(error_response)).into_response();
        RecordedErrors::attach(&mut response, RecordedError::new(self));
        response
    }
}

/// Maps an AppError variant to its corresponding HTTP status code.
pub fn error_to_status_code(error: &AppError) -> StatusCode {
    match error {
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
        AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Maps an AppError variant to its error code string.
pub fn error_to_code(error: &AppError) -> &'static str {
    match error {
        AppError::NotFound { .. } => "NOT_FOUND",
        AppError::BadRequest { .. } => "BAD_REQUEST",
        AppError::Unauthorized { .. } => "UNAUTHORIZED",
        AppError::Forbidden { .. } => "FORBIDDEN",
        AppError::Configuration { .. } => "CONFIGURATION_ERROR",
        AppError::Upstream { .. } => "UPSTREAM_ERROR",
        AppError::Internal { .. } => "INTERNAL_ERROR",
    }
}
