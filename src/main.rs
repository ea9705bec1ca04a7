//! Bookden Backend
//!
//! A book platform backend with a manifest-driven plugin system.

use bookden::{api, core, plugin};

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (handles CLI args, env vars, and config file)
    let config = match core::Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Print error to stderr since logging isn't initialized yet
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Initialize logging system based on configuration
    let _logger = match core::Logger::init(&config.logging) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return Err(e);
        }
    };

    info!("Starting Bookden Backend v{}", bookden::VERSION);
    info!(
        host = %config.server.host,
        port = config.server.port,
        "Server configuration"
    );
    info!(
        plugins_root = ?config.plugins.plugins_root,
        static_root = ?config.plugins.static_root,
        dev_mode = config.plugins.dev_mode,
        "Plugin configuration"
    );

    // Ensure required directories exist
    for dir in [&config.plugins.plugins_root, &config.plugins.static_root] {
        if !dir.exists() {
            info!("Creating directory: {:?}", dir);
            std::fs::create_dir_all(dir)
                .map_err(|e| anyhow::anyhow!("Failed to create directory {:?}: {}", dir, e))?;
        }
    }

    // Initialize plugin system
    let router_handle = Arc::new(plugin::RouterHandle::new());
    let model_catalog = Arc::new(plugin::ModelCatalog::new());
    let registry = Arc::new(plugin::PluginRegistry::new(
        &config.plugins,
        router_handle.clone(),
        model_catalog,
    ));

    info!("Loading plugins...");
    registry.load_all().await?;
    info!(count = registry.list().await.len(), "Plugins loaded");

    // Initialize API server
    let server_url = format!("http://{}:{}", config.server.host, config.server.port);
    let server = api::ApiServer::new(
        config.server.clone(),
        registry,
        &router_handle,
        &config.plugins.static_root,
    );

    info!(url = %server_url, "Server ready - starting to serve requests");

    // Start serving (this will block until shutdown signal)
    server.serve().await?;

    Ok(())
}
