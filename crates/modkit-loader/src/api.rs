//! The base loader interface handed to mods.

use modkit_config::Config;
use modkit_core::ModRegistry;

use crate::discovery::ModLocation;

/// What a mod may ask of the loader while it is being constructed.
///
/// Construction shapes that take a `&dyn ModApi` work against any loader;
/// shapes that take the concrete [`ModLoader`](crate::ModLoader) see
/// everything it offers.
pub trait ModApi {
    /// Launch arguments.
    fn args(&self) -> &[String];

    /// Mod bundle locations found by discovery, in discovery order.
    fn mod_locations(&self) -> &[ModLocation];

    /// The registry as it stands (mods registered so far).
    fn registry(&self) -> &ModRegistry;

    /// The loader configuration.
    fn config(&self) -> &Config;
}
