//! Layered configuration loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge the config file, if one was given
//! 3. Apply `MODKIT_*` env var fallbacks for fields no file set
//! 4. Deserialize merged tree → `Config`
//! 5. Validate

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, deep_merge_tracking, record_leaves};
use crate::show::ResolvedConfig;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum config file size (1 MiB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Load configuration from defaults, an optional file, and the process
/// environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file is unreadable or malformed, or if
/// the merged configuration fails validation.
pub fn load(path: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    load_with_env(path, &collect_env_vars())
}

/// Like [`load`], with an explicit environment.
///
/// # Errors
///
/// See [`load`].
pub fn load_with_env<S: ::std::hash::BuildHasher>(
    path: Option<&Path>,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<ResolvedConfig> {
    // 1. Embedded defaults.
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;
    let mut field_sources = FieldSources::new();
    record_leaves(&merged, "", &ConfigLayer::Defaults, &mut field_sources);
    let mut loaded_files = Vec::new();

    // 2. Config file.
    if let Some(path) = path {
        let overlay = read_toml(path)?;
        deep_merge_tracking(
            &mut merged,
            &overlay,
            "",
            &ConfigLayer::File,
            &mut field_sources,
        );
        loaded_files.push(path.display().to_string());
        info!(path = %path.display(), "loaded config file");
    }

    // 3. Env var fallbacks.
    let env_count = apply_env_fallbacks(&mut merged, &mut field_sources, env_vars);
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    // 4. Deserialize.
    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    // 5. Validate.
    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources,
        loaded_files,
    })
}

/// Load a config from a specific file path (no layering, no env).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or validated.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let config: Config = read_toml(path)?
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;
    validate::validate(&config)?;
    Ok(config)
}

fn read_toml(path: &Path) -> ConfigResult<toml::Value> {
    let metadata = std::fs::metadata(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit",
                metadata.len()
            ),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn defaults_match_type_defaults() {
        let resolved = load_with_env(None, &no_env()).unwrap();
        assert_eq!(resolved.config, Config::default());
        assert!(resolved.loaded_files.is_empty());
        assert_eq!(
            resolved.field_sources.get("loader.builtins"),
            Some(&ConfigLayer::Defaults)
        );
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("modkit.toml");
        std::fs::write(
            &path,
            "[loader]\nmods_dir = \"plugins\"\nmain = \"app.Main\"\n[logging]\nformat = \"json\"\n",
        )
        .unwrap();

        let resolved = load_with_env(Some(&path), &no_env()).unwrap();
        assert_eq!(resolved.config.loader.mods_dir, "plugins");
        assert_eq!(resolved.config.loader.main.as_deref(), Some("app.Main"));
        assert_eq!(resolved.config.loader.manifest_name, "Mod.toml");
        assert_eq!(resolved.config.logging.format, "json");
        assert_eq!(resolved.loaded_files.len(), 1);
    }

    #[test]
    fn env_is_fallback_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("modkit.toml");
        std::fs::write(&path, "[loader]\nmods_dir = \"from-file\"\n").unwrap();

        let env: HashMap<String, String> = [
            ("MODKIT_MODS_DIR".to_owned(), "from-env".to_owned()),
            ("MODKIT_TEST_MOD".to_owned(), "../dev-mod".to_owned()),
            ("MODKIT_LOG".to_owned(), "debug".to_owned()),
        ]
        .into_iter()
        .collect();

        let resolved = load_with_env(Some(&path), &env).unwrap();
        assert_eq!(resolved.config.loader.mods_dir, "from-file");
        assert_eq!(resolved.config.loader.test_mod.as_deref(), Some("../dev-mod"));
        assert_eq!(resolved.config.logging.level, "debug");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("modkit.toml");
        std::fs::write(&path, "[loader\nmods_dir = ").unwrap();

        let err = load_with_env(Some(&path), &no_env()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let err = load_with_env(Some(&dir.path().join("absent.toml")), &no_env()).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn invalid_values_fail_validation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("modkit.toml");
        std::fs::write(&path, "[logging]\nlevel = \"loud\"\n").unwrap();

        let err = load_with_env(Some(&path), &no_env()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { ref field, .. } if field == "logging.level"));
    }

    #[test]
    fn load_file_skips_layering() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("modkit.toml");
        std::fs::write(&path, "[loader]\nbuiltins = false\n").unwrap();

        let config = load_file(&path).unwrap();
        assert!(!config.loader.builtins);
        assert_eq!(config.loader.mods_dir, "./mods");
    }
}
