//! Test fixtures for loaders and registries.

use std::sync::Arc;

use modkit_core::{Mod, ModRegistry, RegisteredMod, TypeDecl};
use modkit_loader::{ModClassPath, ModLoader};

use crate::mocks::{FixedDiscovery, MemoryArtifactSource, RecordingBackend};
use crate::mods::{ScriptedClassMod, ScriptedResourceMod};

/// A loader over the built-in class path with a recording backend and no
/// discovered bundles.
#[must_use]
pub fn test_loader(source: MemoryArtifactSource) -> ModLoader {
    test_loader_with(ModClassPath::new(), source)
}

/// Like [`test_loader`], over a custom class path.
#[must_use]
pub fn test_loader_with(class_path: ModClassPath, source: MemoryArtifactSource) -> ModLoader {
    ModLoader::new(class_path, Arc::new(source))
        .with_backend(Arc::new(RecordingBackend::new()))
        .with_discovery(FixedDiscovery::default())
}

/// Declare and register a scripted class mod on a loader.
///
/// # Panics
///
/// Panics if the declaration is rejected.
pub fn register_class_mod(
    loader: &mut ModLoader,
    class_mod: Arc<ScriptedClassMod>,
) -> Arc<ScriptedClassMod> {
    loader
        .declare(class_mod.decl())
        .expect("Failed to declare scripted class mod");
    loader.register_mod(class_mod)
}

/// Declare and register a scripted resource mod on a loader.
///
/// # Panics
///
/// Panics if the declaration is rejected.
pub fn register_resource_mod(
    loader: &mut ModLoader,
    resource_mod: Arc<ScriptedResourceMod>,
) -> Arc<ScriptedResourceMod> {
    loader
        .declare(resource_mod.decl())
        .expect("Failed to declare scripted resource mod");
    loader.register_mod(resource_mod)
}

/// Declare `decl` and register `instance` on a bare registry.
///
/// # Panics
///
/// Panics if the declaration is rejected.
pub fn register_declared(
    registry: &mut ModRegistry,
    decl: TypeDecl,
    instance: Arc<dyn Mod>,
) -> RegisteredMod {
    registry
        .declare(decl)
        .expect("Failed to declare mod type");
    registry.register(instance)
}
