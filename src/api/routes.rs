//! API routes

use crate::api::handlers::{
    disable_plugin, enable_plugin, get_plugin, health_check, install_plugin, list_plugins,
    uninstall_plugin, AppState,
};
use axum::{
    routing::{get, post},
    Router,
};

/// Build the admin API routes
pub fn build_api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Plugin management endpoints
        .route("/api/v1/plugins", get(list_plugins))
        .route(
            "/api/v1/plugins/:name",
            get(get_plugin).delete(uninstall_plugin),
        )
        .route("/api/v1/plugins/install", post(install_plugin))
        .route("/api/v1/plugins/:name/enable", post(enable_plugin))
        .route("/api/v1/plugins/:name/disable", post(disable_plugin))
        .with_state(state)
}
