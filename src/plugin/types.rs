//! Plugin capability surface
//!
//! The [`Plugin`] trait is the contract every extension module implements and
//! the registry drives. [`BasePlugin`] is the default implementation the
//! registry constructs for manifest-only plugins: no-op route and model hooks
//! plus enabled/disabled bookkeeping for start/stop.

use crate::core::error::Result;
use crate::plugin::host::RouterHandle;
use crate::plugin::manifest::PluginManifest;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Status string for an enabled plugin
pub const STATUS_STARTED: &str = "started";
/// Status string for a disabled plugin
pub const STATUS_STOPPED: &str = "stopped";

/// Contract between the registry and a loaded plugin
#[async_trait::async_trait]
pub trait Plugin: Send + Sync {
    /// One-time setup before the plugin is reachable; called at most once per load
    async fn init(&self) -> Result<()>;

    /// Enable the plugin; must tolerate being called when already started
    async fn start(&self) -> Result<()>;

    /// Disable the plugin; must tolerate being called when already stopped
    async fn stop(&self) -> Result<()>;

    /// Current lifecycle status ("started"/"stopped")
    fn status(&self) -> String;

    /// Declared plugin version
    fn version(&self) -> String;

    /// Register HTTP routes into the host's router; called once per load
    fn register_api_routes(&self, router: &RouterHandle);

    /// Persistence model identifiers to forward to the host; may be empty
    fn register_models(&self) -> Vec<String>;

    /// Point-in-time projection for listing and inspection
    fn info(&self) -> PluginInfo;
}

/// Read-only projection of a plugin's runtime status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub dependencies: HashMap<String, String>,
    pub enabled: bool,
}

/// Snapshot row returned by the registry's list operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginStatus {
    pub name: String,
    pub status: String,
    pub version: String,
}

/// Constructor the registry uses to materialize a plugin for a manifest
///
/// Hosts register a factory per plugin name for plugins with custom behavior;
/// names without a factory fall back to [`BasePlugin`].
pub type PluginFactory = Arc<dyn Fn(Arc<PluginManifest>) -> Arc<dyn Plugin> + Send + Sync>;

/// Default plugin implementation bound to a manifest
pub struct BasePlugin {
    manifest: Arc<PluginManifest>,
    enabled: AtomicBool,
}

impl BasePlugin {
    pub fn new(manifest: Arc<PluginManifest>) -> Self {
        Self {
            manifest,
            enabled: AtomicBool::new(false),
        }
    }

    pub fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }
}

#[async_trait::async_trait]
impl Plugin for BasePlugin {
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        self.enabled.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.enabled.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn status(&self) -> String {
        if self.enabled.load(Ordering::SeqCst) {
            STATUS_STARTED.to_string()
        } else {
            STATUS_STOPPED.to_string()
        }
    }

    fn version(&self) -> String {
        self.manifest.version.clone()
    }

    fn register_api_routes(&self, _router: &RouterHandle) {
        // Manifest-only plugins contribute no routes
    }

    fn register_models(&self) -> Vec<String> {
        self.manifest.backend.models.clone()
    }

    fn info(&self) -> PluginInfo {
        let opt = |s: &String| {
            if s.is_empty() {
                None
            } else {
                Some(s.clone())
            }
        };

        PluginInfo {
            name: self.manifest.name.clone(),
            version: self.manifest.version.clone(),
            description: opt(&self.manifest.description),
            author: opt(&self.manifest.author),
            license: opt(&self.manifest.license),
            homepage: None,
            repository: None,
            tags: Vec::new(),
            dependencies: self.manifest.dependencies.backend.clone(),
            enabled: self.enabled.load(Ordering::SeqCst),
        }
    }
}
