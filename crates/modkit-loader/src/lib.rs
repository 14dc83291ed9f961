//! modkit Loader - discovery, construction and the runtime host surface.
//!
//! This crate provides:
//! - The [`ModClassPath`] of mod classes the host can construct by name
//! - The flexible construction protocol behind
//!   [`ModLoader::register_mod_by_name`]
//! - Filesystem discovery ([`FsDiscovery`]) and manifest scanning
//!   ([`ManifestScanner`])
//! - The built-in [`ClassReplacement`] and [`ClassAugmentation`] mods
//! - [`ModLoader`] for the registration phase and [`ModRuntime`] once it
//!   is frozen
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use modkit_core::{ArtifactSource, ModError, ModResult, NotFoundKind};
//! use modkit_loader::{ModClassPath, ModLoader};
//!
//! struct Classes;
//!
//! impl ArtifactSource for Classes {
//!     fn load_raw_artifact(&self, name: &str) -> ModResult<Vec<u8>> {
//!         Err(ModError::not_found(NotFoundKind::Artifact, name))
//!     }
//! }
//!
//! # fn main() -> ModResult<()> {
//! let mut loader = ModLoader::new(ModClassPath::new(), Arc::new(Classes));
//! loader.init()?;
//! let runtime = loader.start(None, &[])?;
//! assert!(!runtime.hooks_class("pkg.Foo"));
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod api;
pub mod builtins;
pub mod classpath;
mod construct;
pub mod discovery;
pub mod loader;
pub mod patch;
pub mod runtime;
pub mod scanner;

pub use api::ModApi;
pub use builtins::{
    CLASS_AUGMENTATION, CLASS_AUGMENTATION_PRIORITY, CLASS_REPLACEMENT, CLASS_REPLACEMENT_PRIORITY,
    ClassAugmentation, ClassReplacement,
};
pub use classpath::{
    ApiBuild, EntryPoint, LoaderBuild, ModClass, ModClassPath, PlainBuild, ShapeKind, Signature,
};
pub use discovery::{DiscoveryService, FsDiscovery, ModLocation};
pub use loader::ModLoader;
pub use patch::{PatchPass, PreloadPass};
pub use runtime::ModRuntime;
pub use scanner::{
    ManifestEntry, ManifestScanner, ModManifest, ModScanner, PlannedMod, load_manifest,
};
