//! Plugin manifest loading and validation
//!
//! Every plugin directory carries a `plugin.json` descriptor declaring the
//! plugin's identity, its dependencies on other plugins, and its front-end
//! and back-end layout. The manifest is immutable once loaded; the same
//! instance backs the plugin for its entire lifetime in the registry.

use crate::core::error::{BookdenError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Fixed descriptor filename inside each plugin directory
pub const MANIFEST_FILE: &str = "plugin.json";

/// On-disk plugin descriptor
///
/// Unknown fields are ignored; missing optional fields default to empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Unique plugin name; also the directory name under the plugins root
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub enable: bool,
    #[serde(default)]
    pub dependencies: ManifestDependencies,
    #[serde(default)]
    pub frontend: FrontendManifest,
    #[serde(default)]
    pub backend: BackendManifest,
}

/// Declared dependencies of a plugin
///
/// Only the plugin list is enforced at load time. The frontend and backend
/// version maps are advisory; nothing checks them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestDependencies {
    #[serde(default)]
    pub plugins: Vec<String>,
    #[serde(default)]
    pub frontend: HashMap<String, String>,
    #[serde(default)]
    pub backend: HashMap<String, String>,
}

/// Front-end descriptor: entry file and declared asset paths
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrontendManifest {
    #[serde(default)]
    pub entry: String,
    #[serde(default)]
    pub assets: Vec<String>,
}

/// Back-end descriptor: main entry and persistence model identifiers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendManifest {
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub models: Vec<String>,
}

/// Reads and validates plugin manifests from the plugins root
///
/// Read-only; safe to call repeatedly and concurrently.
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    plugins_root: PathBuf,
}

impl ManifestLoader {
    pub fn new(plugins_root: impl Into<PathBuf>) -> Self {
        Self {
            plugins_root: plugins_root.into(),
        }
    }

    /// Path of the descriptor file for a plugin name
    pub fn manifest_path(&self, name: &str) -> PathBuf {
        self.plugins_root.join(name).join(MANIFEST_FILE)
    }

    /// Load and validate the manifest for a plugin directory
    pub fn load(&self, name: &str) -> Result<PluginManifest> {
        let path = self.manifest_path(name);

        let data = std::fs::read_to_string(&path).map_err(|e| {
            BookdenError::NotFound(format!(
                "plugin manifest {}: {}",
                path.display(),
                e
            ))
        })?;

        let manifest: PluginManifest = serde_json::from_str(&data).map_err(|e| {
            BookdenError::ParseError(format!("plugin manifest {}: {}", path.display(), e))
        })?;

        if manifest.name.is_empty() {
            return Err(BookdenError::ValidationError(format!(
                "plugin manifest {}: name is required",
                path.display()
            )));
        }

        // The declared name is the registry key; a manifest claiming another
        // plugin's name must not get that far
        if manifest.name != name {
            return Err(BookdenError::ValidationError(format!(
                "plugin manifest {}: declared name {:?} does not match directory {:?}",
                path.display(),
                manifest.name,
                name
            )));
        }

        Ok(manifest)
    }

    pub fn plugins_root(&self) -> &Path {
        &self.plugins_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_manifest(root: &Path, name: &str, body: &str) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(MANIFEST_FILE), body).unwrap();
    }

    #[test]
    fn test_load_full_manifest() {
        let tmp = TempDir::new().unwrap();
        write_manifest(
            tmp.path(),
            "reviews",
            r#"{
                "name": "reviews",
                "version": "1.2.0",
                "description": "Reader reviews",
                "author": "bookden",
                "license": "MIT",
                "enable": true,
                "dependencies": {
                    "plugins": ["ratings"],
                    "frontend": { "vue": "^3.0.0" },
                    "backend": { "gorm": ">=1.25" }
                },
                "frontend": { "entry": "index.js", "assets": ["css/reviews.css"] },
                "backend": { "main": "main.go", "models": ["Review", "ReviewVote"] }
            }"#,
        );

        let loader = ManifestLoader::new(tmp.path());
        let manifest = loader.load("reviews").unwrap();

        assert_eq!(manifest.name, "reviews");
        assert_eq!(manifest.version, "1.2.0");
        assert!(manifest.enable);
        assert_eq!(manifest.dependencies.plugins, vec!["ratings"]);
        assert_eq!(manifest.dependencies.frontend.get("vue").unwrap(), "^3.0.0");
        assert_eq!(manifest.frontend.entry, "index.js");
        assert_eq!(manifest.backend.models, vec!["Review", "ReviewVote"]);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let tmp = TempDir::new().unwrap();
        write_manifest(tmp.path(), "minimal", r#"{ "name": "minimal" }"#);

        let loader = ManifestLoader::new(tmp.path());
        let manifest = loader.load("minimal").unwrap();

        assert_eq!(manifest.name, "minimal");
        assert!(manifest.version.is_empty());
        assert!(manifest.dependencies.plugins.is_empty());
        assert!(manifest.backend.models.is_empty());
        assert!(!manifest.enable);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let tmp = TempDir::new().unwrap();
        write_manifest(
            tmp.path(),
            "extra",
            r#"{ "name": "extra", "not_a_real_field": { "nested": 1 } }"#,
        );

        let loader = ManifestLoader::new(tmp.path());
        assert!(loader.load("extra").is_ok());
    }

    #[test]
    fn test_missing_manifest_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let loader = ManifestLoader::new(tmp.path());

        let err = loader.load("ghost").unwrap_err();
        assert!(matches!(err, BookdenError::NotFound(_)));
    }

    #[test]
    fn test_malformed_manifest_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        write_manifest(tmp.path(), "broken", "{ not json");

        let loader = ManifestLoader::new(tmp.path());
        let err = loader.load("broken").unwrap_err();
        assert!(matches!(err, BookdenError::ParseError(_)));
    }

    #[test]
    fn test_name_mismatching_directory_is_validation_error() {
        let tmp = TempDir::new().unwrap();
        write_manifest(
            tmp.path(),
            "reviews-v2",
            r#"{ "name": "reviews", "version": "2.0.0" }"#,
        );

        let loader = ManifestLoader::new(tmp.path());
        let err = loader.load("reviews-v2").unwrap_err();
        assert!(matches!(err, BookdenError::ValidationError(_)));
    }

    #[test]
    fn test_empty_name_is_validation_error() {
        let tmp = TempDir::new().unwrap();
        write_manifest(tmp.path(), "unnamed", r#"{ "name": "" }"#);

        let loader = ManifestLoader::new(tmp.path());
        let err = loader.load("unnamed").unwrap_err();
        assert!(matches!(err, BookdenError::ValidationError(_)));
    }
}
