//! Outbound HTTP collaborators.

pub mod auth0;
pub mod client;

pub use auth0::{ManagementTokenClient, ManagementTokenError, parse_access_token};
pub use client::HTTP_CLIENT;
