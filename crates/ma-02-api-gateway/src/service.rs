//! API Gateway service - main entry point.
//!
//! Owns the configuration and the shared verifier, builds the router with
//! its middleware stack and serves it until shutdown.

use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::middleware::{create_cors_layer, InitDataAuthLayer, TracingLayer};
use crate::routes::{self, AppState};
use axum::{extract::DefaultBodyLimit, Router};
use ma_01_init_data::{InitDataService, InitDataVerificationApi, PlatformCredential};
use std::future::Future;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

/// API Gateway service state
pub struct GatewayService {
    config: GatewayConfig,
    verifier: Arc<dyn InitDataVerificationApi>,
}

impl GatewayService {
    /// Create a gateway that verifies against `credential` on the wall clock.
    pub fn new(config: GatewayConfig, credential: PlatformCredential) -> Result<Self, GatewayError> {
        Self::with_verifier(config, Arc::new(InitDataService::new(credential)))
    }

    /// Create a gateway around an existing verifier.
    pub fn with_verifier(
        config: GatewayConfig,
        verifier: Arc<dyn InitDataVerificationApi>,
    ) -> Result<Self, GatewayError> {
        config.validate()?;
        Ok(Self { config, verifier })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Build the HTTP router with the full middleware stack.
    pub fn router(&self) -> Router {
        let state = AppState {
            verifier: Arc::clone(&self.verifier),
            max_age: self.config.auth.max_age_secs,
        };

        let auth = InitDataAuthLayer::new(
            Arc::clone(&self.verifier),
            self.config.auth_header(),
            self.config.auth.max_age_secs,
        );

        // Build middleware stack
        let middleware = ServiceBuilder::new()
            .layer(TracingLayer::new())
            .layer(create_cors_layer(&self.config.effective_cors()))
            .layer(TimeoutLayer::new(self.config.timeouts.request));

        routes::routes(state, auth)
            .layer(DefaultBodyLimit::max(self.config.limits.max_body_bytes))
            .layer(middleware)
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.http_addr();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))?;

        info!(
            addr = %addr,
            header = %self.config.auth.header_name,
            max_age_secs = ?self.config.auth.max_age_secs,
            "Starting HTTP server"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| GatewayError::Server(e.to_string()))?;

        info!("API Gateway stopped");
        Ok(())
    }
}

impl std::fmt::Debug for GatewayService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Waits for Ctrl-C and returns, used for graceful shutdown.
pub async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
