//! Server module for managing HTTP server lifecycle
//!
//! This module handles server initialization, startup, and graceful shutdown.

use std::net::SocketAddr;

use crate::api::middleware::create_jwt_auth;
use crate::api::routes::create_router;
use crate::auth::ScopeClaims;
use crate::config::{Environment, settings::Settings};
use crate::state::AppState;
use tokio::net::TcpListener;
use tokio::signal;

/// HTTP server manager
pub struct Server {
    settings: Settings,
}

impl Server {
    /// Create a new server with the given settings
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Start the server and run until shutdown signal
    ///
    /// This method:
    /// 1. Logs startup information
    /// 2. Builds JWT authentication and starts the key-set refresh task
    /// 3. Creates application state and the router
    /// 4. Binds to configured address
    /// 5. Starts the HTTP server with graceful shutdown
    ///
    /// # Errors
    /// - Auth or CORS configuration errors
    /// - Address binding errors
    /// - Server runtime errors
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!(
            app_name = %self.settings.application.name,
            app_version = %self.settings.application.version,
            environment = %Environment::from_env().as_str(),
            "Application starting"
        );

        tracing::info!(
            host = %self.settings.server.host,
            port = %self.settings.server.port,
            health_check_path = %self.settings.access_log.health_check_path,
            "Server configuration loaded"
        );

        let mut state = AppState::new(self.settings.clone());
        let refresh_task = if self.settings.auth.enabled() {
            let (auth, jwks) = create_jwt_auth::<ScopeClaims>(&self.settings.auth).map_err(|e| {
                tracing::error!(error = %e, "JWT configuration failed");
                anyhow::anyhow!("JWT configuration failed: {}", e)
            })?;
            tracing::info!(
                issuer = %self.settings.auth.issuer_url(),
                jwks_url = %jwks.jwks_url(),
                refresh_interval_secs = jwks.refresh_interval().as_secs(),
                "JWT validation configured"
            );
            state = state.with_auth(auth);
            Some(jwks.spawn_refresh())
        } else {
            tracing::warn!("auth.domain is empty, /api/me routes will reject every request");
            None
        };

        let router = create_router(state)?;
        tracing::info!("Router configured");

        let address = self.settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;

        tracing::info!(address = %address, "Server listening");

        // Connect info feeds http:req:remoteAddr
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        if let Some(task) = refresh_task {
            task.abort();
        }
        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
