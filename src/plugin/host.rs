//! Host-side surfaces handed to plugins
//!
//! The registry does not own an HTTP router or a persistence layer. It
//! receives a [`RouterHandle`] and a [`ModelRegistrar`] at construction and
//! passes them unchanged to each plugin during load; what the host does with
//! the registered routes and model names is its own business.

use crate::core::error::Result;
use axum::Router;
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

/// Shared handle over the host's router
///
/// Plugins merge their routes into it during `register_api_routes`; the host
/// takes the accumulated router back when it assembles the HTTP server. The
/// core defines no routes on this handle itself.
pub struct RouterHandle {
    inner: Mutex<Router>,
}

impl RouterHandle {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Router::new()),
        }
    }

    /// Merge a plugin's routes into the shared router
    pub fn merge(&self, routes: Router) {
        let mut guard = self.inner.lock().unwrap();
        let current = std::mem::take(&mut *guard);
        *guard = current.merge(routes);
    }

    /// Nest a plugin's routes under a path prefix
    pub fn nest(&self, path: &str, routes: Router) {
        let mut guard = self.inner.lock().unwrap();
        let current = std::mem::take(&mut *guard);
        *guard = current.nest(path, routes);
    }

    /// Take the accumulated router, leaving an empty one behind
    pub fn take(&self) -> Router {
        std::mem::take(&mut *self.inner.lock().unwrap())
    }
}

impl Default for RouterHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver for the persistence model identifiers a plugin declares
///
/// The registry delivers each plugin's model list unmodified, once, after a
/// successful init and asset staging.
pub trait ModelRegistrar: Send + Sync {
    fn register(&self, plugin: &str, models: &[String]) -> Result<()>;
}

/// Host-side model registrar that records declared models per plugin
///
/// Stands in for the persistence layer's registrar at the composition root;
/// the recorded names are available for inspection and logged on arrival.
#[derive(Default)]
pub struct ModelCatalog {
    models: RwLock<HashMap<String, Vec<String>>>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Model identifiers registered by a plugin, if any
    pub fn models_for(&self, plugin: &str) -> Option<Vec<String>> {
        self.models.read().unwrap().get(plugin).cloned()
    }
}

impl ModelRegistrar for ModelCatalog {
    fn register(&self, plugin: &str, models: &[String]) -> Result<()> {
        if !models.is_empty() {
            tracing::info!(plugin = %plugin, models = ?models, "Registering plugin models");
        }
        self.models
            .write()
            .unwrap()
            .insert(plugin.to_string(), models.to_vec());
        Ok(())
    }
}
