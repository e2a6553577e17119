//! webutil-rs library
//!
//! HTTP middleware helpers for axum services: structured access logging
//! with a request body tee, JWT validation with claims lookup and scope
//! checks, CORS, request IDs, and a management-API token client.

use shadow_rs::shadow;
shadow!(build);

pub mod access_log;
pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod external;
pub mod logger;
pub mod server;
pub mod state;

pub use state::AppState;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
