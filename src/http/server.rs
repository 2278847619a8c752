//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (request ID, tracing)
//! - Own the runtime config cell, connector, and stabilizer
//! - Serve until the shutdown signal fires

use axum::{routing::any, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{AdminConfig, BackendAddress, ConfigError, ProxyConfig, RuntimeConfig};
use crate::http::handler::proxy_handler;
use crate::lifecycle::shutdown;
use crate::stabilize::Stabilizer;
use crate::upstream::UpstreamConnector;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<RuntimeConfig>,
    pub connector: UpstreamConnector,
    pub stabilizer: Arc<Stabilizer>,
    pub admin: AdminConfig,
}

/// HTTP server for the stability proxy.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &ProxyConfig) -> Result<Self, ConfigError> {
        let backend = BackendAddress::parse(&config.backend.selenium_address)
            .map_err(|e| ConfigError::Validation(vec![e]))?;
        let runtime = Arc::new(RuntimeConfig::new(backend, config.stabilization.enabled));

        let state = AppState {
            runtime,
            connector: UpstreamConnector::new(config.timeouts.upstream()),
            stabilizer: Arc::new(Stabilizer::new(
                &config.stabilization,
                config.timeouts.probe(),
            )?),
            admin: config.admin.clone(),
        };

        let router = Self::build_router(state.clone());
        Ok(Self { router, state })
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Runtime settings shared with the admin namespace.
    pub fn runtime(&self) -> Arc<RuntimeConfig> {
        self.state.runtime.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let snapshot = self.state.runtime.snapshot();
        tracing::info!(
            address = %addr,
            selenium_address = %snapshot.backend,
            stabilization_enabled = snapshot.stabilization_enabled,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::recv(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
