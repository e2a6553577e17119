//! Middleware components for request processing.
//!
//! This module contains middleware for access logging, request ID tracking,
//! CORS, error handling, and JWT authentication.

pub mod access_log;
mod auth;
mod cors;
mod error_handler;
mod request_id;

pub use access_log::{AccessLog, access_log_middleware};
pub use auth::{JwtAuth, create_jwt_auth, jwt_auth_middleware};
pub use cors::cors_layer;
pub use error_handler::{error_to_code, error_to_status_code};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
