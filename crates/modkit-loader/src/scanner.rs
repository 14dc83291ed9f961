//! Manifest-driven mod scanning.
//!
//! A bundle lists its mod classes in a TOML manifest:
//!
//! ```toml
//! [[mod]]
//! class = "example.IconPack"
//! priority = 10
//! ```
//!
//! Entries from every discovered bundle are stable-sorted by priority
//! (lower first; discovery order breaks ties) and registered by name.

use std::path::{Path, PathBuf};

use modkit_config::LoaderSection;
use modkit_core::{ModError, ModResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::builtins;
use crate::discovery::ModLocation;
use crate::loader::ModLoader;

/// Maximum manifest size (256 KiB).
const MAX_MANIFEST_SIZE: u64 = 256 * 1024;

/// Finds mod classes in discovered bundles and registers them.
pub trait ModScanner: Send + Sync {
    /// Register every mod found in `loader`'s discovered locations.
    ///
    /// # Errors
    ///
    /// Implementations should contain per-mod failures; an error here
    /// aborts initialization.
    fn scan_for_mods(&self, loader: &mut ModLoader) -> ModResult<()>;
}

/// A parsed bundle manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModManifest {
    /// Mod classes in this bundle.
    #[serde(default, rename = "mod")]
    pub mods: Vec<ManifestEntry>,
}

/// One `[[mod]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Mod class name on the class path.
    pub class: String,
    /// Load priority; falls back to the class's declared priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

/// Read and parse a manifest file.
///
/// # Errors
///
/// Returns [`ModError::Manifest`] if the file is unreadable, too large or
/// malformed.
pub fn load_manifest(path: &Path) -> ModResult<ModManifest> {
    let manifest_error = |message: String| ModError::Manifest {
        path: path.to_path_buf(),
        message,
    };

    let metadata = std::fs::metadata(path).map_err(|e| manifest_error(e.to_string()))?;
    if metadata.len() > MAX_MANIFEST_SIZE {
        return Err(manifest_error(format!(
            "manifest is {} bytes, exceeding the {MAX_MANIFEST_SIZE} byte limit",
            metadata.len()
        )));
    }
    let content = std::fs::read_to_string(path).map_err(|e| manifest_error(e.to_string()))?;
    toml::from_str(&content).map_err(|e| manifest_error(e.to_string()))
}

/// A manifest entry queued for registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMod {
    /// Mod class name.
    pub class: String,
    /// Effective priority.
    pub priority: i32,
    /// Bundle the entry came from.
    pub location: ModLocation,
}

/// Scans bundle manifests.
#[derive(Debug, Clone)]
pub struct ManifestScanner {
    manifest_name: String,
}

impl ManifestScanner {
    /// Look for `manifest_name` inside directory bundles.
    #[must_use]
    pub fn new(manifest_name: impl Into<String>) -> Self {
        Self {
            manifest_name: manifest_name.into(),
        }
    }

    /// Build from the `[loader]` configuration section.
    #[must_use]
    pub fn from_config(loader: &LoaderSection) -> Self {
        Self::new(loader.manifest_name.clone())
    }

    /// The manifest file backing `location`, if it has one.
    fn manifest_path(&self, location: &ModLocation) -> Option<PathBuf> {
        let path = location.path()?;
        if path.is_dir() {
            let manifest = path.join(&self.manifest_name);
            if manifest.is_file() {
                return Some(manifest);
            }
            debug!(path = %path.display(), "Bundle has no manifest");
            return None;
        }
        Some(path.to_path_buf())
    }

    fn entries(&self, location: &ModLocation) -> Vec<ManifestEntry> {
        if *location == ModLocation::Builtin {
            return builtins::manifest_entries();
        }
        let Some(path) = self.manifest_path(location) else {
            return Vec::new();
        };
        match load_manifest(&path) {
            Ok(manifest) => manifest.mods,
            Err(e) => {
                warn!(location = %location, error = %e, "Skipping unreadable mod bundle");
                Vec::new()
            },
        }
    }

    /// Every mod the loader's locations name, in registration order.
    #[must_use]
    pub fn plan(&self, loader: &ModLoader) -> Vec<PlannedMod> {
        let mut planned: Vec<PlannedMod> = loader
            .mod_locations()
            .iter()
            .flat_map(|location| {
                self.entries(location).into_iter().map(|entry| {
                    let priority = entry
                        .priority
                        .or_else(|| loader.mod_class(&entry.class).and_then(|c| c.priority()))
                        .unwrap_or(0);
                    PlannedMod {
                        class: entry.class,
                        priority,
                        location: location.clone(),
                    }
                })
            })
            .collect();
        planned.sort_by_key(|m| m.priority);
        planned
    }
}

impl Default for ManifestScanner {
    fn default() -> Self {
        Self::from_config(&LoaderSection::default())
    }
}

impl ModScanner for ManifestScanner {
    fn scan_for_mods(&self, loader: &mut ModLoader) -> ModResult<()> {
        let planned = self.plan(loader);
        let mut registered: usize = 0;

        for entry in &planned {
            match loader.register_mod_by_name(&entry.class) {
                Ok(_) => registered = registered.saturating_add(1),
                Err(e) => warn!(
                    class = %entry.class,
                    location = %entry.location,
                    error = %e,
                    "Failed to load mod, skipping"
                ),
            }
        }

        info!(
            found = planned.len(),
            registered,
            "Scanned mod bundles"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn parses_manifest_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Mod.toml");
        std::fs::write(
            &path,
            "[[mod]]\nclass = \"a.First\"\npriority = 5\n\n[[mod]]\nclass = \"a.Second\"\n",
        )
        .unwrap();

        let manifest = load_manifest(&path).unwrap();
        assert_eq!(
            manifest.mods,
            [
                ManifestEntry {
                    class: "a.First".to_owned(),
                    priority: Some(5),
                },
                ManifestEntry {
                    class: "a.Second".to_owned(),
                    priority: None,
                },
            ]
        );
    }

    #[test]
    fn empty_manifest_has_no_mods() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Mod.toml");
        std::fs::write(&path, "").unwrap();
        assert!(load_manifest(&path).unwrap().mods.is_empty());
    }

    #[test]
    fn malformed_manifest_is_a_manifest_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Mod.toml");
        std::fs::write(&path, "[[mod]]\npriority = \"high\"\n").unwrap();
        let err = load_manifest(&path).unwrap_err();
        assert!(matches!(err, ModError::Manifest { path: ref p, .. } if *p == path));
    }

    #[test]
    fn directory_without_manifest_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let scanner = ManifestScanner::default();
        assert!(
            scanner
                .entries(&ModLocation::Directory(dir.path().to_path_buf()))
                .is_empty()
        );
    }

    #[test]
    fn builtin_location_lists_builtins() {
        let scanner = ManifestScanner::new("Bundle.toml");
        assert_eq!(scanner.entries(&ModLocation::Builtin).len(), 2);
    }
}
