//! Built-in class replacement and augmentation through a full start-up.

use std::sync::Arc;

use modkit_core::{MOD_CONTRACT, Mod, ModError, TypeDecl, TypeName, TypeRef};
use modkit_loader::{
    ClassAugmentation, ClassReplacement, ModApi, ModClass, ModClassPath, ModLoader, ModLocation,
    ModRuntime, PreloadPass,
};
use modkit_test::{FixedDiscovery, MemoryArtifactSource, RecordingBackend};

/// Replaces `game.Player` and augments `game.World` while being built.
struct Overhaul {
    args: Vec<String>,
}

impl Mod for Overhaul {
    fn declared_type(&self) -> TypeName {
        TypeName::from_static("ext.Overhaul")
    }
}

fn source() -> MemoryArtifactSource {
    MemoryArtifactSource::new()
        .with_artifact("game.Player", b"player".to_vec())
        .with_artifact("game.World", b"world".to_vec())
        .with_artifact("ext.Player", b"ext-player".to_vec())
        .with_artifact("ext.WorldExtras", b"+extras".to_vec())
        .with_artifact("ext.WorldMore", b"+more".to_vec())
}

fn class_path() -> ModClassPath {
    let mut class_path = ModClassPath::new();
    class_path
        .insert(
            ModClass::new(TypeDecl::new("ext.Overhaul").implements(TypeRef::Named(MOD_CONTRACT)))
                .factory_with_loader(|loader: &ModLoader, args: &[String]| {
                    loader.replace_class("game.Player", "ext.Player")?;
                    loader.augment_class("game.World", "ext.WorldExtras")?;
                    loader.augment_class("game.World", "ext.WorldMore")?;
                    Ok(Arc::new(Overhaul {
                        args: args.to_vec(),
                    }) as Arc<dyn Mod>)
                }),
        )
        .unwrap();
    class_path.insert_entry_point("game.Main", |runtime: &ModRuntime, args: &[String]| {
        if args.first().map(String::as_str) != Some("--play") {
            return Err(ModError::in_mod("game.Main", "expected --play"));
        }
        runtime.redefine_class("game.Player").map(|_| ())
    });
    class_path
}

fn loader(backend: Arc<RecordingBackend>) -> ModLoader {
    let mut loader = ModLoader::new(class_path(), Arc::new(source()))
        .with_backend(backend)
        .with_discovery(FixedDiscovery::new(vec![ModLocation::Builtin]))
        .with_args(vec!["--seed".to_owned(), "7".to_owned()]);
    loader.init().unwrap();
    loader.register_mod_by_name("ext.Overhaul").unwrap();
    loader
}

#[test]
fn replacement_and_augmentation_go_through_the_backend() {
    let backend = Arc::new(RecordingBackend::new());
    let runtime = loader(Arc::clone(&backend)).freeze();

    assert_eq!(runtime.redefine_class("game.Player").unwrap(), b"ext-player");
    assert_eq!(runtime.redefine_class("game.World").unwrap(), b"world+extras+more");
    assert_eq!(
        backend.calls(),
        [
            "retarget:ext.Player->game.Player",
            "augment:game.World+ext.WorldExtras",
            "augment:game.World+ext.WorldMore",
        ]
    );

    let replacement = runtime.find_mod::<ClassReplacement>().unwrap();
    assert_eq!(replacement.replacement_for("game.Player").as_deref(), Some("ext.Player"));
    let augmentation = runtime.find_mod::<ClassAugmentation>().unwrap();
    assert_eq!(augmentation.augmentations_for("game.World").len(), 2);
}

#[test]
fn mods_receive_launch_arguments() {
    let loader = loader(Arc::new(RecordingBackend::new()));
    assert_eq!(ModApi::args(&loader), ["--seed", "7"]);
    let overhaul = loader.registry().find_mod::<Overhaul>().unwrap();
    assert_eq!(overhaul.args, ["--seed", "7"]);
}

#[test]
fn start_preloads_then_runs_the_entry_point() {
    let backend = Arc::new(RecordingBackend::new());
    let runtime = loader(Arc::clone(&backend))
        .with_patch_pass(PreloadPass::new().with_class("game.World"))
        .start(Some("game.Main"), &["--play".to_owned()])
        .unwrap();

    // World by the preload pass, Player by the entry point.
    assert_eq!(backend.calls().len(), 3);
    assert_eq!(runtime.entry_point_names(), ["game.Main"]);
}

#[test]
fn entry_point_failure_is_reported() {
    let err = loader(Arc::new(RecordingBackend::new()))
        .start(Some("game.Main"), &[])
        .unwrap_err();
    assert!(matches!(err, ModError::EntryPoint { ref message, .. } if message.contains("--play")));
}

#[test]
fn without_backend_builtins_fail_loudly() {
    let mut loader = ModLoader::new(class_path(), Arc::new(source()))
        .with_discovery(FixedDiscovery::new(vec![ModLocation::Builtin]));
    loader.init().unwrap();
    loader.register_mod_by_name("ext.Overhaul").unwrap();

    let runtime = loader.freeze();
    let err = runtime.redefine_class("game.Player").unwrap_err();
    assert!(matches!(err, ModError::BackendUnavailable { ref name } if name == "game.Player"));
}
