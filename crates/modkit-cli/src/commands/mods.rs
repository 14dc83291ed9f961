//! `modkit mods`: discovered bundles and the order their mods would load in.

use std::sync::Arc;

use anyhow::Result;
use modkit_config::Config;
use modkit_core::{ArtifactSource, ModError, ModResult, NotFoundKind};
use modkit_loader::{ManifestScanner, ModClassPath, ModLoader, PlannedMod};
use tracing::debug;

use crate::theme::Theme;

/// The CLI inspects bundles only; it never loads class definitions.
struct NoArtifacts;

impl ArtifactSource for NoArtifacts {
    fn load_raw_artifact(&self, name: &str) -> ModResult<Vec<u8>> {
        Err(ModError::not_found(NotFoundKind::Artifact, name))
    }
}

/// Discover bundles for `config` and resolve their load order without
/// constructing any mod.
fn resolve(config: &Config) -> (ModLoader, Vec<PlannedMod>) {
    let mut loader =
        ModLoader::new(ModClassPath::new(), Arc::new(NoArtifacts)).with_config(config.clone());
    loader.discover();
    let plan = ManifestScanner::from_config(&config.loader).plan(&loader);
    debug!(
        mods_dir = %config.loader.mods_dir,
        bundles = loader.mod_locations().len(),
        mods = plan.len(),
        "Resolved mod load order"
    );
    (loader, plan)
}

/// Print discovered bundles and the resolved load order.
#[allow(clippy::unnecessary_wraps)]
pub(crate) fn list_mods(config: &Config) -> Result<()> {
    let (loader, plan) = resolve(config);

    println!("{}", Theme::header("Mod bundles"));
    if loader.mod_locations().is_empty() {
        println!("  {}", Theme::info("No bundles found"));
    }
    for (i, location) in loader.mod_locations().iter().enumerate() {
        println!("  {}. {location}", i.saturating_add(1));
    }

    println!("\n{}", Theme::header("Load order"));
    println!("  {:<40} {:>8}  BUNDLE", "CLASS", "PRIORITY");
    println!("{}", Theme::rule());

    let mut unknown: usize = 0;
    for planned in &plan {
        let bundle = planned.location.to_string();
        let bundle = if loader.mod_class(&planned.class).is_some() {
            Theme::dimmed(&bundle)
        } else {
            unknown = unknown.saturating_add(1);
            Theme::warning(&format!("{bundle} (not on class path)"))
        };
        println!(
            "{}",
            Theme::load_order_row(&planned.class, planned.priority, &bundle)
        );
    }

    println!(
        "\n{}",
        Theme::dimmed(&format!(
            "{} mod(s), {} bundle(s)",
            plan.len(),
            loader.mod_locations().len()
        ))
    );
    if unknown > 0 {
        println!(
            "{}",
            Theme::warning(&format!("{unknown} mod(s) name classes this host does not provide"))
        );
    }
    Ok(())
}
