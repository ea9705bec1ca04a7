//! Plugin front-end asset staging
//!
//! Reconciles a plugin's declared front-end sources with the directory the
//! host serves statically. Each plugin gets one entry under the static root,
//! named after the plugin. In development the entry is a symbolic link to the
//! plugin's front-end source tree; in production it is a recursive copy of
//! the built-assets directory. Both modes are idempotent: reruns recreate the
//! same link or overwrite files with identical content.

use crate::core::error::{BookdenError, Result};
use crate::plugin::manifest::PluginManifest;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Front-end source directory inside a plugin package
const FRONTEND_DIR: &str = "frontend";
/// Built-assets directory used in production staging
const DIST_DIR: &str = "dist";

/// Stages plugin assets into the host's static-serving directory
#[derive(Debug, Clone)]
pub struct AssetStager {
    plugins_root: PathBuf,
    static_root: PathBuf,
    dev_mode: bool,
}

impl AssetStager {
    pub fn new(
        plugins_root: impl Into<PathBuf>,
        static_root: impl Into<PathBuf>,
        dev_mode: bool,
    ) -> Self {
        Self {
            plugins_root: plugins_root.into(),
            static_root: static_root.into(),
            dev_mode,
        }
    }

    /// Target directory a plugin's assets are served from
    pub fn asset_path(&self, plugin_name: &str) -> PathBuf {
        self.static_root.join(plugin_name)
    }

    /// Stage a plugin's front-end assets under the static root
    ///
    /// A failed production copy leaves a partial tree behind; the operation
    /// is safe to re-run and overwrites files deterministically.
    pub fn stage(&self, manifest: &PluginManifest) -> Result<()> {
        std::fs::create_dir_all(&self.static_root).map_err(|e| {
            BookdenError::StagingError(format!(
                "creating static root {}: {}",
                self.static_root.display(),
                e
            ))
        })?;

        if self.dev_mode {
            self.stage_dev(manifest)
        } else {
            self.stage_prod(manifest)
        }
    }

    /// Development mode: link the target at the plugin's front-end sources
    fn stage_dev(&self, manifest: &PluginManifest) -> Result<()> {
        let source = self.plugins_root.join(&manifest.name).join(FRONTEND_DIR);
        let target = self.asset_path(&manifest.name);

        if !source.exists() {
            return Err(BookdenError::StagingError(format!(
                "frontend source missing for plugin {}: {}",
                manifest.name,
                source.display()
            )));
        }

        remove_existing(&target)?;
        symlink_dir(&source, &target).map_err(|e| {
            BookdenError::StagingError(format!(
                "linking {} -> {}: {}",
                target.display(),
                source.display(),
                e
            ))
        })?;

        tracing::debug!(plugin = %manifest.name, target = %target.display(), "Linked dev assets");
        Ok(())
    }

    /// Production mode: recursive copy of the built-assets directory
    fn stage_prod(&self, manifest: &PluginManifest) -> Result<()> {
        let source = self
            .plugins_root
            .join(&manifest.name)
            .join(FRONTEND_DIR)
            .join(DIST_DIR);
        let target = self.asset_path(&manifest.name);

        copy_dir(&source, &target).map_err(|e| {
            BookdenError::StagingError(format!(
                "copying assets for plugin {}: {}",
                manifest.name, e
            ))
        })?;

        tracing::debug!(plugin = %manifest.name, target = %target.display(), "Copied production assets");
        Ok(())
    }

    /// Remove a plugin's staged assets; a missing target is not an error
    pub fn unstage(&self, plugin_name: &str) -> Result<()> {
        let target = self.asset_path(plugin_name);
        remove_existing(&target)
    }
}

/// Remove a staged target, whether it is a symlink, a directory, or a file
fn remove_existing(target: &Path) -> Result<()> {
    let metadata = match std::fs::symlink_metadata(target) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(BookdenError::StagingError(format!(
                "inspecting {}: {}",
                target.display(),
                e
            )))
        }
    };

    let result = if metadata.is_dir() {
        std::fs::remove_dir_all(target)
    } else {
        // Symlinks (including links to directories) are removed as files
        std::fs::remove_file(target)
    };

    result.map_err(|e| {
        BookdenError::StagingError(format!("removing {}: {}", target.display(), e))
    })
}

/// Recursively copy a directory tree, preserving relative layout and mode
fn copy_dir(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(std::io::Error::other)?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(std::io::Error::other)?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            // fs::copy carries the source file's permission bits along
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn symlink_dir(source: &Path, target: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(source, target)
}

#[cfg(windows)]
fn symlink_dir(source: &Path, target: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(source, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manifest(name: &str) -> PluginManifest {
        PluginManifest {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn write_file(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    struct Fixture {
        _tmp: TempDir,
        plugins_root: PathBuf,
        static_root: PathBuf,
    }

    fn fixture() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let plugins_root = tmp.path().join("plugins");
        let static_root = tmp.path().join("public").join("plugins");
        std::fs::create_dir_all(&plugins_root).unwrap();
        Fixture {
            plugins_root,
            static_root,
            _tmp: tmp,
        }
    }

    #[test]
    fn test_prod_stage_copies_tree() {
        let fx = fixture();
        let dist = fx.plugins_root.join("reviews/frontend/dist");
        write_file(&dist.join("index.html"), "<html>reviews</html>");
        write_file(&dist.join("css/app.css"), "body {}");

        let stager = AssetStager::new(&fx.plugins_root, &fx.static_root, false);
        stager.stage(&manifest("reviews")).unwrap();

        let staged = stager.asset_path("reviews");
        assert_eq!(
            std::fs::read_to_string(staged.join("index.html")).unwrap(),
            "<html>reviews</html>"
        );
        assert_eq!(
            std::fs::read_to_string(staged.join("css/app.css")).unwrap(),
            "body {}"
        );
    }

    #[test]
    fn test_prod_stage_roundtrip_after_unstage() {
        let fx = fixture();
        let dist = fx.plugins_root.join("reviews/frontend/dist");
        write_file(&dist.join("index.html"), "v1");
        write_file(&dist.join("js/main.js"), "console.log(1)");

        let stager = AssetStager::new(&fx.plugins_root, &fx.static_root, false);
        stager.stage(&manifest("reviews")).unwrap();
        stager.unstage("reviews").unwrap();
        assert!(!stager.asset_path("reviews").exists());

        stager.stage(&manifest("reviews")).unwrap();
        let staged = stager.asset_path("reviews");
        assert_eq!(std::fs::read_to_string(staged.join("index.html")).unwrap(), "v1");
        assert_eq!(
            std::fs::read_to_string(staged.join("js/main.js")).unwrap(),
            "console.log(1)"
        );
    }

    #[test]
    fn test_prod_stage_is_idempotent() {
        let fx = fixture();
        let dist = fx.plugins_root.join("reviews/frontend/dist");
        write_file(&dist.join("index.html"), "same");

        let stager = AssetStager::new(&fx.plugins_root, &fx.static_root, false);
        stager.stage(&manifest("reviews")).unwrap();
        stager.stage(&manifest("reviews")).unwrap();

        assert_eq!(
            std::fs::read_to_string(stager.asset_path("reviews").join("index.html")).unwrap(),
            "same"
        );
    }

    #[test]
    fn test_prod_stage_missing_dist_fails() {
        let fx = fixture();
        std::fs::create_dir_all(fx.plugins_root.join("reviews")).unwrap();

        let stager = AssetStager::new(&fx.plugins_root, &fx.static_root, false);
        let err = stager.stage(&manifest("reviews")).unwrap_err();
        assert!(matches!(err, BookdenError::StagingError(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_dev_stage_creates_symlink_and_is_idempotent() {
        let fx = fixture();
        let frontend = fx.plugins_root.join("reviews/frontend");
        write_file(&frontend.join("index.js"), "export {}");

        let stager = AssetStager::new(&fx.plugins_root, &fx.static_root, true);
        stager.stage(&manifest("reviews")).unwrap();
        // Second run replaces the link without error
        stager.stage(&manifest("reviews")).unwrap();

        let target = stager.asset_path("reviews");
        let meta = std::fs::symlink_metadata(&target).unwrap();
        assert!(meta.file_type().is_symlink());
        assert_eq!(std::fs::read_link(&target).unwrap(), frontend);
        assert!(target.join("index.js").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_dev_stage_replaces_stale_directory() {
        let fx = fixture();
        let frontend = fx.plugins_root.join("reviews/frontend");
        write_file(&frontend.join("index.js"), "export {}");

        // Leftover physical directory from an earlier production deployment
        write_file(&fx.static_root.join("reviews/old.html"), "stale");

        let stager = AssetStager::new(&fx.plugins_root, &fx.static_root, true);
        stager.stage(&manifest("reviews")).unwrap();

        let meta = std::fs::symlink_metadata(stager.asset_path("reviews")).unwrap();
        assert!(meta.file_type().is_symlink());
    }

    #[test]
    fn test_dev_stage_missing_source_fails() {
        let fx = fixture();
        std::fs::create_dir_all(fx.plugins_root.join("reviews")).unwrap();

        let stager = AssetStager::new(&fx.plugins_root, &fx.static_root, true);
        let err = stager.stage(&manifest("reviews")).unwrap_err();
        assert!(matches!(err, BookdenError::StagingError(_)));
    }

    #[test]
    fn test_unstage_missing_target_is_ok() {
        let fx = fixture();
        let stager = AssetStager::new(&fx.plugins_root, &fx.static_root, false);
        assert!(stager.unstage("never-staged").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_unstage_removes_symlink_not_source() {
        let fx = fixture();
        let frontend = fx.plugins_root.join("reviews/frontend");
        write_file(&frontend.join("index.js"), "export {}");

        let stager = AssetStager::new(&fx.plugins_root, &fx.static_root, true);
        stager.stage(&manifest("reviews")).unwrap();
        stager.unstage("reviews").unwrap();

        assert!(std::fs::symlink_metadata(stager.asset_path("reviews")).is_err());
        // Source tree untouched
        assert!(frontend.join("index.js").exists());
    }
}
