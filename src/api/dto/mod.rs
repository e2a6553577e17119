//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `error` - Common error response DTOs
//! - `health` - Health check response
//! - `me` - Views of the caller's validated token

mod error;
mod health;
mod me;

pub use error::ErrorResponse;
pub use health::HealthResponse;
pub use me::{MeResponse, ScopeCheckResponse};
