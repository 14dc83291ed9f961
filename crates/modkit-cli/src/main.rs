//! modkit CLI - inspect mod bundles and configuration.
//!
//! The CLI never constructs mods: mod classes are compiled into the host
//! binary. It shows what a host with the same configuration would discover
//! and in which order the named mods would register.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use modkit_telemetry::{LogConfig, setup_logging};
use tracing::debug;

mod commands;
mod theme;

/// modkit - mod loading for plugin hosts
#[derive(Parser)]
#[command(name = "modkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "MODKIT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show discovered mod bundles and the resolved load order
    Mods,

    /// View and validate configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show resolved configuration with source annotations
    Show {
        /// Show only a specific section (loader or logging)
        #[arg(short, long)]
        section: Option<String>,
    },
    /// Validate the current configuration
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let resolved = modkit_config::Config::load(cli.config.as_deref());

    // Set up logging from config, with --verbose override.
    let mut log_config = match &resolved {
        Ok(r) => LogConfig::from_section(&r.config.logging).unwrap_or_default(),
        // Fallback if config loading fails; the command reports the error.
        Err(_) => LogConfig::default(),
    };
    if cli.verbose {
        "debug".clone_into(&mut log_config.level);
    }
    if let Err(e) = setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }
    if let Ok(r) = &resolved {
        debug!(files = ?r.loaded_files, "Configuration loaded");
    }

    match cli.command {
        Commands::Mods => commands::mods::list_mods(&resolved?.config)?,
        Commands::Config { command } => match command {
            ConfigCommands::Show { section } => {
                commands::config::show_config(&resolved?, section.as_deref())?;
            },
            ConfigCommands::Validate => commands::config::validate_config(resolved),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["modkit", "config", "show", "-s", "loader", "-c", "host.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("host.toml")));
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommands::Show { section: Some(ref s) }
            } if s == "loader"
        ));
    }
}
