//! Application state for Axum web framework.
//!
//! Contains the settings and the middleware bundles shared by every request.

use std::sync::Arc;

use crate::access_log::LogSink;
use crate::api::middleware::{AccessLog, JwtAuth};
use crate::auth::ScopeClaims;
use crate::config::Settings;

/// Application state containing all shared resources.
///
/// Cloning is cheap; everything inside is reference counted.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Loaded and validated settings
    pub settings: Arc<Settings>,
    /// Access-log middleware state
    pub access_log: AccessLog,
    /// Authentication for the `/api/me` routes; `None` when auth is disabled
    pub auth: Option<JwtAuth<ScopeClaims>>,
}

impl AppState {
    /// Creates state without authentication, logging through `tracing`.
    pub fn new(settings: Settings) -> Self {
        let access_log = AccessLog::new(&settings.access_log);
        Self {
            settings: Arc::new(settings),
            access_log,
            auth: None,
        }
    }

    pub fn with_auth(mut self, auth: JwtAuth<ScopeClaims>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Sends access-log records to `sink` instead of `tracing`.
    pub fn with_access_log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.access_log = self.access_log.with_sink(sink);
        self
    }
}
