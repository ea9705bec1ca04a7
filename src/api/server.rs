//! HTTP server implementation
//!
//! Assembles the admin API routes, the routes plugins registered through the
//! shared router handle, and static serving of staged plugin assets into one
//! Axum router, then serves it with graceful shutdown.

use crate::api::handlers::AppState;
use crate::api::routes::build_api_routes;
use crate::core::config::ServerConfig;
use crate::plugin::{PluginRegistry, RouterHandle};
use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

/// URL prefix staged plugin assets are served under
const PLUGIN_ASSETS_PREFIX: &str = "/public/plugins";

/// HTTP API server
pub struct ApiServer {
    router: Router,
    config: ServerConfig,
}

impl ApiServer {
    /// Create a new API server
    ///
    /// Drains the shared router handle, so plugin routes registered after
    /// this call are not served.
    pub fn new(
        config: ServerConfig,
        registry: Arc<PluginRegistry>,
        router_handle: &RouterHandle,
        static_root: &Path,
    ) -> Self {
        let router = Self::build_router(registry, router_handle, static_root);
        Self { router, config }
    }

    fn build_router(
        registry: Arc<PluginRegistry>,
        router_handle: &RouterHandle,
        static_root: &Path,
    ) -> Router {
        let state = AppState { registry };

        build_api_routes(state)
            .merge(router_handle.take())
            .nest_service(PLUGIN_ASSETS_PREFIX, ServeDir::new(static_root))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive()),
            )
    }

    /// Start the HTTP server and listen for requests
    ///
    /// Blocks until the server is shut down gracefully.
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let socket_addr: SocketAddr = addr.parse()?;

        let listener = tokio::net::TcpListener::bind(socket_addr).await?;
        info!(addr = %socket_addr, "HTTP server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("HTTP server shut down gracefully");
        Ok(())
    }

    /// Get a reference to the router
    pub fn router(&self) -> &Router {
        &self.router
    }
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .unwrap_or_else(|e| tracing::error!(error = %e, "Failed to install Ctrl+C handler"));
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::PluginsConfig;
    use crate::plugin::ModelCatalog;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_build_router_drains_plugin_routes() {
        let tmp = TempDir::new().unwrap();
        let config = PluginsConfig {
            plugins_root: tmp.path().join("plugins"),
            static_root: tmp.path().join("public/plugins"),
            dev_mode: false,
        };

        let handle = Arc::new(RouterHandle::new());
        let registry = Arc::new(PluginRegistry::new(
            &config,
            handle.clone(),
            Arc::new(ModelCatalog::new()),
        ));

        handle.merge(Router::new().route(
            "/api/v1/reviews",
            axum::routing::get(|| async { "reviews" }),
        ));

        let server = ApiServer::new(
            ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            registry,
            &handle,
            &config.static_root,
        );
        let _ = server.router();

        // Handle was drained into the server router
        drop(handle.take());
    }
}
