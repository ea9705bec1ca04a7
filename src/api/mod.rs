//! REST API module
//!
//! This module provides the HTTP server and the plugin administration
//! endpoints:
//! - Plugin list, detail, install, uninstall, enable, disable
//! - Static serving of staged plugin assets
//! - Routes contributed by plugins through the shared router handle

pub mod handlers;
pub mod models;
pub mod routes;
pub mod server;

pub use handlers::AppState;
pub use models::{InstallPluginRequest, MessageResponse, PluginsListResponse};
pub use routes::build_api_routes;
pub use server::ApiServer;
