//! CLI handlers for the `modkit config` subcommand.

use anyhow::Result;
use modkit_config::{ConfigResult, ResolvedConfig};

use crate::theme::Theme;

/// Show the resolved configuration with source annotations.
pub(crate) fn show_config(resolved: &ResolvedConfig, section: Option<&str>) -> Result<()> {
    let output = resolved.show(section).map_err(|_| match section {
        Some(name) => anyhow::anyhow!("no such config section: {name}"),
        None => anyhow::anyhow!("failed to format config"),
    })?;

    println!("{output}");
    Ok(())
}

/// Validate the configuration, exiting non-zero if it is invalid.
pub(crate) fn validate_config(resolved: ConfigResult<ResolvedConfig>) {
    match resolved {
        Ok(resolved) => {
            println!("{}", Theme::success("Configuration is valid."));
            if !resolved.loaded_files.is_empty() {
                println!("\nLoaded files:");
                for path in &resolved.loaded_files {
                    println!("  - {path}");
                }
            }
        },
        Err(e) => {
            eprintln!("{}", Theme::error(&format!("Configuration error: {e}")));
            std::process::exit(1);
        },
    }
}
