//! Bookden Backend Library
//!
//! This library provides the plugin extensibility runtime for the Bookden
//! backend, including manifest loading, lifecycle orchestration, event
//! distribution, asset staging, and the plugin administration REST API.

pub mod api;
pub mod core;
pub mod plugin;

// Re-export commonly used types
pub use api::ApiServer;
pub use crate::core::{BookdenError, Config, EventBus, Logger};
pub use plugin::{ModelCatalog, Plugin, PluginManifest, PluginRegistry, RouterHandle};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
