//! Admin API handlers for plugin management

use crate::api::models::{InstallPluginRequest, MessageResponse, PluginsListResponse};
use crate::core::error::Result;
use crate::plugin::PluginRegistry;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state for handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<PluginRegistry>,
}

/// Handler for GET /health - Liveness probe
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
    }))
}

/// Handler for GET /api/v1/plugins - List all plugins
pub async fn list_plugins(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let plugins = state.registry.list().await;
    let total = plugins.len();

    Ok(Json(PluginsListResponse { plugins, total }))
}

/// Handler for GET /api/v1/plugins/:name - Get plugin details
pub async fn get_plugin(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse> {
    let info = state.registry.get(&name).await?;
    Ok(Json(info))
}

/// Handler for POST /api/v1/plugins/install - Load a plugin from the plugins root
pub async fn install_plugin(
    State(state): State<AppState>,
    Json(request): Json<InstallPluginRequest>,
) -> Result<impl IntoResponse> {
    state.registry.load(&request.name).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(format!(
            "Plugin {} installed successfully",
            request.name
        ))),
    ))
}

/// Handler for DELETE /api/v1/plugins/:name - Stop and remove a plugin
pub async fn uninstall_plugin(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse> {
    state.registry.uninstall(&name).await?;

    Ok(Json(MessageResponse::new(format!(
        "Plugin {} uninstalled successfully",
        name
    ))))
}

/// Handler for POST /api/v1/plugins/:name/enable - Start a loaded plugin
pub async fn enable_plugin(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse> {
    state.registry.enable(&name).await?;

    Ok(Json(MessageResponse::new(format!(
        "Plugin {} enabled",
        name
    ))))
}

/// Handler for POST /api/v1/plugins/:name/disable - Stop a plugin, keeping it loaded
pub async fn disable_plugin(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse> {
    state.registry.disable(&name).await?;

    Ok(Json(MessageResponse::new(format!(
        "Plugin {} disabled",
        name
    ))))
}
