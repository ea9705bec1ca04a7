//! Plugin subsystem
//!
//! This module provides the extensibility runtime:
//! - Manifest loading and validation (`plugin.json` descriptors)
//! - Registry with lifecycle orchestration (load, enable, disable, uninstall)
//! - Front-end asset staging into the static-serving directory
//! - Host boundary surfaces for HTTP routes and persistence models

pub mod assets;
pub mod host;
pub mod manifest;
pub mod registry;
pub mod types;

pub use assets::AssetStager;
pub use host::{ModelCatalog, ModelRegistrar, RouterHandle};
pub use manifest::{ManifestLoader, PluginManifest, MANIFEST_FILE};
pub use registry::PluginRegistry;
pub use types::{
    BasePlugin, Plugin, PluginFactory, PluginInfo, PluginStatus, STATUS_STARTED, STATUS_STOPPED,
};
