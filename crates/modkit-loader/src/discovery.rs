//! Mod bundle discovery.

use std::fmt;
use std::path::{Path, PathBuf};

use modkit_config::LoaderSection;
use tracing::{debug, info, warn};

/// Where a mod bundle lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModLocation {
    /// The bundle compiled into the host (the built-in mods).
    Builtin,
    /// The configured test mod override, a directory or a manifest file.
    TestMod(PathBuf),
    /// A directory bundle holding a manifest.
    Directory(PathBuf),
    /// A standalone manifest file.
    Manifest(PathBuf),
}

impl ModLocation {
    /// The filesystem path, if the bundle has one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Builtin => None,
            Self::TestMod(p) | Self::Directory(p) | Self::Manifest(p) => Some(p),
        }
    }
}

impl fmt::Display for ModLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => f.write_str("<builtin>"),
            Self::TestMod(p) => write!(f, "{} (test mod)", p.display()),
            Self::Directory(p) | Self::Manifest(p) => write!(f, "{}", p.display()),
        }
    }
}

/// Enumerates candidate mod bundles. Order seeds registration order.
pub trait DiscoveryService: Send + Sync {
    /// Every bundle location, in load order.
    fn find_mod_artifacts(&self) -> Vec<ModLocation>;
}

/// Filesystem discovery.
///
/// Yields the built-in bundle, then the test mod override, then every
/// directory and `*.toml` file directly inside the mods directory, sorted
/// by file name.
#[derive(Debug, Clone)]
pub struct FsDiscovery {
    mods_dir: PathBuf,
    test_mod: Option<PathBuf>,
    builtins: bool,
    base_dir: Option<PathBuf>,
}

impl FsDiscovery {
    /// Discover bundles under `mods_dir`, built-ins included.
    #[must_use]
    pub fn new(mods_dir: impl Into<PathBuf>) -> Self {
        Self {
            mods_dir: mods_dir.into(),
            test_mod: None,
            builtins: true,
            base_dir: None,
        }
    }

    /// Build from the `[loader]` configuration section.
    #[must_use]
    pub fn from_config(loader: &LoaderSection) -> Self {
        Self {
            mods_dir: loader.mods_dir_path(),
            test_mod: loader.test_mod_path(),
            builtins: loader.builtins,
            base_dir: None,
        }
    }

    /// Add a test mod override.
    #[must_use]
    pub fn with_test_mod(mut self, test_mod: impl Into<PathBuf>) -> Self {
        self.test_mod = Some(test_mod.into());
        self
    }

    /// Whether the built-in bundle is listed.
    #[must_use]
    pub fn with_builtins(mut self, builtins: bool) -> Self {
        self.builtins = builtins;
        self
    }

    /// Resolve relative paths against `base_dir` instead of the working
    /// directory.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) => base.join(path),
            None => path.to_path_buf(),
        }
    }

    fn scan_mods_dir(&self, locations: &mut Vec<ModLocation>) {
        let mods_dir = self.resolve(&self.mods_dir);
        let entries = match std::fs::read_dir(&mods_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %mods_dir.display(), "Mods directory does not exist");
                return;
            },
            Err(e) => {
                warn!(path = %mods_dir.display(), error = %e, "Failed to read mods directory");
                return;
            },
        };

        let mut found: Vec<(std::ffi::OsString, ModLocation)> = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(path = %mods_dir.display(), error = %e, "Failed to read directory entry");
                    continue;
                },
            };
            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(t) => t,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to stat mod bundle");
                    continue;
                },
            };

            if file_type.is_dir() {
                found.push((entry.file_name(), ModLocation::Directory(path)));
            } else if path.extension().is_some_and(|ext| ext == "toml") {
                found.push((entry.file_name(), ModLocation::Manifest(path)));
            } else {
                debug!(path = %path.display(), "Ignoring non-bundle file");
            }
        }

        found.sort_by(|(a, _), (b, _)| a.cmp(b));
        locations.extend(found.into_iter().map(|(_, location)| location));
    }
}

impl DiscoveryService for FsDiscovery {
    fn find_mod_artifacts(&self) -> Vec<ModLocation> {
        let mut locations = Vec::new();

        if self.builtins {
            locations.push(ModLocation::Builtin);
        }

        if let Some(test_mod) = &self.test_mod {
            let path = self.resolve(test_mod);
            if path.exists() {
                locations.push(ModLocation::TestMod(path));
            } else {
                warn!(path = %path.display(), "Configured test mod does not exist");
            }
        }

        self.scan_mods_dir(&mut locations);

        info!(
            count = locations.len(),
            mods_dir = %self.mods_dir.display(),
            "Discovered mod bundles"
        );
        locations
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn builtins_then_sorted_bundles() {
        let dir = TempDir::new().unwrap();
        let mods = dir.path().join("mods");
        std::fs::create_dir_all(mods.join("zeta")).unwrap();
        std::fs::create_dir_all(mods.join("alpha")).unwrap();
        std::fs::write(mods.join("beta.toml"), "").unwrap();
        std::fs::write(mods.join("readme.md"), "").unwrap();

        let locations = FsDiscovery::new(&mods).find_mod_artifacts();
        assert_eq!(
            locations,
            [
                ModLocation::Builtin,
                ModLocation::Directory(mods.join("alpha")),
                ModLocation::Manifest(mods.join("beta.toml")),
                ModLocation::Directory(mods.join("zeta")),
            ]
        );
    }

    #[test]
    fn test_mod_comes_right_after_builtins() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("mods/a")).unwrap();
        std::fs::create_dir_all(dir.path().join("dev")).unwrap();

        let locations = FsDiscovery::new("mods")
            .with_test_mod("dev")
            .with_base_dir(dir.path())
            .find_mod_artifacts();
        assert_eq!(
            locations,
            [
                ModLocation::Builtin,
                ModLocation::TestMod(dir.path().join("dev")),
                ModLocation::Directory(dir.path().join("mods/a")),
            ]
        );
    }

    #[test]
    fn missing_paths_are_skipped() {
        let dir = TempDir::new().unwrap();
        let locations = FsDiscovery::new(dir.path().join("absent"))
            .with_test_mod(dir.path().join("nope"))
            .with_builtins(false)
            .find_mod_artifacts();
        assert!(locations.is_empty());
    }

    #[test]
    fn from_config_reads_loader_section() {
        let loader = LoaderSection {
            builtins: false,
            test_mod: Some("dev".to_owned()),
            ..LoaderSection::default()
        };
        let discovery = FsDiscovery::from_config(&loader);
        assert!(!discovery.builtins);
        assert_eq!(discovery.test_mod.as_deref(), Some(Path::new("dev")));
        assert_eq!(discovery.mods_dir, PathBuf::from("./mods"));
    }

    #[test]
    fn display() {
        assert_eq!(ModLocation::Builtin.to_string(), "<builtin>");
        assert!(
            ModLocation::TestMod(PathBuf::from("dev"))
                .to_string()
                .ends_with("(test mod)")
        );
    }
}
