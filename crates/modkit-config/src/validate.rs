//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_loader(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_loader(config: &Config) -> ConfigResult<()> {
    let l = &config.loader;

    if l.mods_dir.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "loader.mods_dir".to_owned(),
            message: "mods_dir must not be empty".to_owned(),
        });
    }

    if l.manifest_name.trim().is_empty()
        || l.manifest_name.contains(['/', '\\'])
        || l.manifest_name == ".."
    {
        return Err(ConfigError::ValidationError {
            field: "loader.manifest_name".to_owned(),
            message: format!("'{}' is not a plain file name", l.manifest_name),
        });
    }

    if l.test_mod.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ConfigError::ValidationError {
            field: "loader.test_mod".to_owned(),
            message: "test_mod must not be empty when set".to_owned(),
        });
    }

    if l.main.as_deref().is_some_and(|m| m.trim().is_empty()) {
        return Err(ConfigError::ValidationError {
            field: "loader.main".to_owned(),
            message: "main must not be empty when set".to_owned(),
        });
    }

    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;

    if !matches!(
        l.level.as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        return Err(ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: format!(
                "unknown level '{}'; expected one of: trace, debug, info, warn, error",
                l.level
            ),
        });
    }

    if !matches!(l.format.as_str(), "pretty" | "compact" | "json") {
        return Err(ConfigError::ValidationError {
            field: "logging.format".to_owned(),
            message: format!(
                "unknown format '{}'; expected one of: pretty, compact, json",
                l.format
            ),
        });
    }

    if let Some(bad) = l.directives.iter().find(|d| d.trim().is_empty()) {
        return Err(ConfigError::ValidationError {
            field: "logging.directives".to_owned(),
            message: format!("empty directive '{bad}'"),
        });
    }

    Ok(())
}
