//! Subcommand handlers.

pub(crate) mod config;
pub(crate) mod mods;
