//! Configuration types for the modkit loader.
//!
//! All types in this module are self-contained with no dependencies on other
//! internal modkit crates. Every struct implements [`Default`] with the same
//! values as the embedded `defaults.toml`, so that a bare `[section]` header
//! produces a working configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Mod discovery and loading.
    pub loader: LoaderSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// LoaderSection
// ---------------------------------------------------------------------------

/// Mod discovery and loading settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSection {
    /// Directory scanned for mod bundles (sub-directories and `*.toml`
    /// manifests), relative to the working directory.
    pub mods_dir: String,
    /// A single extra bundle loaded right after the built-in one, for
    /// developing a mod without installing it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_mod: Option<String>,
    /// Manifest file looked up inside directory bundles.
    pub manifest_name: String,
    /// Whether the built-in class replacement and augmentation mods load.
    pub builtins: bool,
    /// Entry point invoked once patching is done.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
}

impl LoaderSection {
    /// The mods directory as a path.
    #[must_use]
    pub fn mods_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.mods_dir)
    }

    /// The test mod location as a path, if configured.
    #[must_use]
    pub fn test_mod_path(&self) -> Option<PathBuf> {
        self.test_mod.as_ref().map(PathBuf::from)
    }
}

impl Default for LoaderSection {
    fn default() -> Self {
        Self {
            mods_dir: "./mods".to_owned(),
            test_mod: None,
            manifest_name: "Mod.toml".to_owned(),
            builtins: true,
            main: None,
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"` (human-friendly), `"compact"` (one-line),
    /// or `"json"` (structured).
    pub format: String,
    /// Per-crate tracing directives (e.g. `["modkit_loader=debug"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}
