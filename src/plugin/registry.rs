//! Plugin registry and lifecycle orchestration
//!
//! The registry owns the event bus, the asset stager, and the map of running
//! plugin instances, and drives every lifecycle transition:
//!
//! ```text
//! absent -> loaded -> started <-> stopped -> absent (uninstalled)
//! ```
//!
//! Load runs manifest validation, the dependency check, plugin construction,
//! init, asset staging, and route/model registration in that order, and only
//! then publishes the plugin in the map — concurrent lookups never observe a
//! half-initialized plugin.

use crate::core::config::PluginsConfig;
use crate::core::error::{BookdenError, Result};
use crate::core::event_bus::EventBus;
use crate::plugin::assets::AssetStager;
use crate::plugin::host::{ModelRegistrar, RouterHandle};
use crate::plugin::manifest::{ManifestLoader, PluginManifest};
use crate::plugin::types::{BasePlugin, Plugin, PluginFactory, PluginInfo, PluginStatus};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

/// Registered plugin plus its per-name lifecycle lock
///
/// Start and stop are never assumed safe to run concurrently against the
/// same plugin; every lifecycle transition takes this lock first.
struct PluginEntry {
    plugin: Arc<dyn Plugin>,
    lifecycle: Mutex<()>,
}

/// Orchestrator for plugin discovery, activation, and teardown
pub struct PluginRegistry {
    loader: ManifestLoader,
    assets: AssetStager,
    events: Arc<EventBus>,
    router: Arc<RouterHandle>,
    models: Arc<dyn ModelRegistrar>,
    plugins_root: PathBuf,
    /// Name -> running instance; exclusive owner of all plugin instances
    plugins: RwLock<HashMap<String, Arc<PluginEntry>>>,
    /// Names with a load in flight; makes concurrent same-name loads exclusive
    /// without holding the map lock across plugin callbacks
    loading: Mutex<HashSet<String>>,
    /// Per-name constructors for plugins with custom backend behavior
    factories: std::sync::RwLock<HashMap<String, PluginFactory>>,
}

impl PluginRegistry {
    pub fn new(
        config: &PluginsConfig,
        router: Arc<RouterHandle>,
        models: Arc<dyn ModelRegistrar>,
    ) -> Self {
        Self {
            loader: ManifestLoader::new(&config.plugins_root),
            assets: AssetStager::new(&config.plugins_root, &config.static_root, config.dev_mode),
            events: Arc::new(EventBus::new()),
            router,
            models,
            plugins_root: config.plugins_root.clone(),
            plugins: RwLock::new(HashMap::new()),
            loading: Mutex::new(HashSet::new()),
            factories: std::sync::RwLock::new(HashMap::new()),
        }
    }

    /// Event bus shared by the host and all plugins
    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Asset stager for the host's static root
    pub fn assets(&self) -> &AssetStager {
        &self.assets
    }

    /// Register a constructor for a named plugin
    ///
    /// Loads of that name use the factory instead of the default
    /// manifest-backed plugin. Must be registered before the plugin loads.
    pub fn register_factory(&self, name: &str, factory: PluginFactory) {
        self.factories
            .write()
            .unwrap()
            .insert(name.to_string(), factory);
    }

    /// Load one plugin by directory name
    ///
    /// Fails with `AlreadyLoaded` if the name is registered or a load for it
    /// is in flight. On any later failure the plugin is not registered and
    /// the reservation is released.
    pub async fn load(&self, name: &str) -> Result<()> {
        {
            let mut loading = self.loading.lock().await;
            if loading.contains(name) || self.plugins.read().await.contains_key(name) {
                return Err(BookdenError::AlreadyLoaded(name.to_string()));
            }
            loading.insert(name.to_string());
        }

        let result = self.load_reserved(name).await;
        self.loading.lock().await.remove(name);
        result
    }

    /// Load body; runs with the name reserved and no map lock held
    async fn load_reserved(&self, name: &str) -> Result<()> {
        let manifest = Arc::new(self.loader.load(name)?);

        self.check_dependencies(&manifest).await?;

        let instance = self.construct(&manifest);

        instance
            .init()
            .await
            .map_err(|e| BookdenError::InitError(format!("plugin {}: {}", name, e)))?;

        self.assets.stage(&manifest)?;

        instance.register_api_routes(&self.router);
        let models = instance.register_models();
        self.models.register(name, &models)?;

        self.plugins.write().await.insert(
            manifest.name.clone(),
            Arc::new(PluginEntry {
                plugin: instance,
                lifecycle: Mutex::new(()),
            }),
        );

        info!(plugin = %name, version = %manifest.version, "Plugin loaded");
        self.emit_lifecycle("plugin.loaded", &manifest.name, &manifest.version);

        Ok(())
    }

    /// Verify every declared plugin dependency is already registered
    ///
    /// Dependencies must be loaded before dependents; the registry does not
    /// reorder or topologically sort — callers own the load order.
    async fn check_dependencies(&self, manifest: &PluginManifest) -> Result<()> {
        let plugins = self.plugins.read().await;
        for dep in &manifest.dependencies.plugins {
            if !plugins.contains_key(dep) {
                return Err(BookdenError::DependencyError(format!(
                    "plugin {} requires {} which is not loaded",
                    manifest.name, dep
                )));
            }
        }
        Ok(())
    }

    /// Materialize the plugin value for a manifest
    fn construct(&self, manifest: &Arc<PluginManifest>) -> Arc<dyn Plugin> {
        let factory = self
            .factories
            .read()
            .unwrap()
            .get(&manifest.name)
            .cloned();

        match factory {
            Some(factory) => factory(manifest.clone()),
            None => Arc::new(BasePlugin::new(manifest.clone())),
        }
    }

    /// Load every plugin directory under the plugins root
    ///
    /// Fail-fast: the first failure aborts the batch and is returned, leaving
    /// previously loaded plugins registered. Callers needing partial
    /// tolerance must load plugins individually.
    pub async fn load_all(&self) -> Result<()> {
        let mut read_dir = tokio::fs::read_dir(&self.plugins_root).await?;

        while let Some(entry) = read_dir.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                warn!(path = %entry.path().display(), "Skipping non-UTF8 plugin directory");
                continue;
            };
            self.load(&name).await?;
        }

        Ok(())
    }

    /// Start a loaded plugin
    ///
    /// Serialized per plugin: concurrent enable/disable/uninstall calls for
    /// the same name run their start/stop one at a time.
    pub async fn enable(&self, name: &str) -> Result<()> {
        let entry = self.entry(name).await?;
        let _transition = entry.lifecycle.lock().await;
        entry
            .plugin
            .start()
            .await
            .map_err(|e| BookdenError::LifecycleError(format!("starting {}: {}", name, e)))?;
        info!(plugin = %name, "Plugin enabled");
        Ok(())
    }

    /// Stop a loaded plugin; it stays registered and addressable
    pub async fn disable(&self, name: &str) -> Result<()> {
        let entry = self.entry(name).await?;
        let _transition = entry.lifecycle.lock().await;
        entry
            .plugin
            .stop()
            .await
            .map_err(|e| BookdenError::LifecycleError(format!("stopping {}: {}", name, e)))?;
        info!(plugin = %name, "Plugin disabled");
        Ok(())
    }

    /// Stop a plugin and remove it from the registry
    ///
    /// Stop is invoked unconditionally and its failure aborts the removal.
    /// Staged assets and persisted resources are the plugin's own cleanup
    /// concern, not the registry's.
    pub async fn uninstall(&self, name: &str) -> Result<()> {
        let entry = self.entry(name).await?;
        let _transition = entry.lifecycle.lock().await;

        entry
            .plugin
            .stop()
            .await
            .map_err(|e| BookdenError::LifecycleError(format!("stopping {}: {}", name, e)))?;

        // A concurrent uninstall that won the race already removed the entry;
        // the loser reports the same NotFound a late caller would see
        if self.plugins.write().await.remove(name).is_none() {
            return Err(BookdenError::NotFound(format!("plugin {}", name)));
        }

        info!(plugin = %name, "Plugin uninstalled");
        self.emit_lifecycle("plugin.unloaded", name, "");

        Ok(())
    }

    /// Read-only snapshot of every registered plugin, sorted by name
    pub async fn list(&self) -> Vec<PluginStatus> {
        let plugins = self.plugins.read().await;
        let mut statuses: Vec<PluginStatus> = plugins
            .iter()
            .map(|(name, entry)| PluginStatus {
                name: name.clone(),
                status: entry.plugin.status(),
                version: entry.plugin.version(),
            })
            .collect();
        statuses.sort_by(|a, b| a.name.cmp(&b.name));
        statuses
    }

    /// Projection of one plugin's current state
    pub async fn get(&self, name: &str) -> Result<PluginInfo> {
        Ok(self.entry(name).await?.plugin.info())
    }

    /// Whether a plugin is currently registered
    pub async fn contains(&self, name: &str) -> bool {
        self.plugins.read().await.contains_key(name)
    }

    async fn entry(&self, name: &str) -> Result<Arc<PluginEntry>> {
        self.plugins
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| BookdenError::NotFound(format!("plugin {}", name)))
    }

    /// Best-effort lifecycle event; a failing subscriber never fails the
    /// lifecycle operation itself
    fn emit_lifecycle(&self, event: &str, name: &str, version: &str) {
        let payload = json!({ "name": name, "version": version });
        if let Err(e) = self.events.emit(event, &payload) {
            warn!(event = %event, plugin = %name, error = %e, "Lifecycle event handler failed");
        }
    }
}
