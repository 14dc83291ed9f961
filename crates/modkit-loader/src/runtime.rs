//! The frozen host surface.

use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

use modkit_config::Config;
use modkit_core::{
    ArtifactSource, BytecodeBackend, ClassBytes, ClassContext, FrozenRegistry, Mod, ModError,
    ModResult, NotFoundKind, ResourceStream, apply_class_mods, apply_resource_mods,
};
use tracing::{info, trace};

use crate::classpath::EntryPoint;
use crate::discovery::ModLocation;

/// Serves artifact requests once every mod is registered.
///
/// Read-only and `Send + Sync`: share it behind an `Arc` between every
/// thread that loads classes or resources.
pub struct ModRuntime {
    pub(crate) registry: FrozenRegistry,
    pub(crate) source: Arc<dyn ArtifactSource>,
    pub(crate) backend: Option<Arc<dyn BytecodeBackend>>,
    pub(crate) entry_points: HashMap<String, EntryPoint>,
    pub(crate) locations: Vec<ModLocation>,
    pub(crate) args: Vec<String>,
    pub(crate) config: Config,
}

impl ModRuntime {
    /// Whether any class mod hooks `class_name`.
    #[must_use]
    pub fn hooks_class(&self, class_name: &str) -> bool {
        self.registry.hooks_class(class_name)
    }

    /// Whether any resource mod hooks `resource_name`.
    #[must_use]
    pub fn hooks_resource(&self, resource_name: &str) -> bool {
        self.registry.hooks_resource(resource_name)
    }

    /// The definition of `class_name` after every hooking class mod ran.
    ///
    /// # Errors
    ///
    /// Returns [`ModError::NotFound`] if no original exists and nothing
    /// hooks the name, [`ModError::UnsatisfiedHook`] if something hooks it
    /// but no definition came out, or the first error a mod or the artifact
    /// source raised.
    pub fn redefine_class(&self, class_name: &str) -> ModResult<ClassBytes> {
        let original = self.source.find_raw_artifact(class_name)?;
        let ctx = ClassContext::new(class_name, Arc::clone(&self.source), self.backend.clone());

        let redefined = apply_class_mods(self.registry.class_mods(), class_name, original, &ctx)?;
        trace!(class = class_name, found = redefined.is_some(), "Redefined class");
        redefined.ok_or_else(|| ModError::not_found(NotFoundKind::Artifact, class_name))
    }

    /// Pass `stream` through every hooking resource mod.
    ///
    /// Never fails; returns `stream` untouched if no mod replaces it.
    #[must_use]
    pub fn redefine_resource_stream(
        &self,
        resource_name: &str,
        stream: ResourceStream,
    ) -> ResourceStream {
        apply_resource_mods(self.registry.resource_mods(), resource_name, stream)
    }

    /// Open `resource_name` from the artifact source, with resource mods
    /// applied.
    ///
    /// # Errors
    ///
    /// Returns the artifact source's error, typically
    /// [`ModError::NotFound`].
    pub fn open_resource(&self, resource_name: &str) -> ModResult<ResourceStream> {
        let raw = self.source.load_raw_artifact(resource_name)?;
        Ok(self.redefine_resource_stream(resource_name, Box::new(Cursor::new(raw))))
    }

    /// First registered mod whose concrete type is `M`.
    #[must_use]
    pub fn find_mod<M: Mod>(&self) -> Option<Arc<M>> {
        self.registry.find_mod::<M>()
    }

    /// The frozen registry.
    #[must_use]
    pub fn registry(&self) -> &FrozenRegistry {
        &self.registry
    }

    /// Bundle locations the loader discovered.
    #[must_use]
    pub fn mod_locations(&self) -> &[ModLocation] {
        &self.locations
    }

    /// Launch arguments mods were constructed with.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The loader configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Entry point names, sorted.
    #[must_use]
    pub fn entry_point_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entry_points.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Invoke the entry point `name` with `args`.
    ///
    /// # Errors
    ///
    /// Returns [`ModError::NotFound`] if there is no such entry point, or
    /// [`ModError::EntryPoint`] wrapping whatever it failed with.
    pub fn run_entry_point(&self, name: &str, args: &[String]) -> ModResult<()> {
        let entry = self
            .entry_points
            .get(name)
            .ok_or_else(|| ModError::not_found(NotFoundKind::EntryPoint, name))?;

        info!(entry_point = name, args = args.len(), "Starting entry point");
        entry(self, args).map_err(|e| match e {
            e @ ModError::EntryPoint { .. } => e,
            other => ModError::EntryPoint {
                name: name.to_owned(),
                message: other.to_string(),
            },
        })
    }
}

impl fmt::Debug for ModRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModRuntime")
            .field("registry", &self.registry)
            .field("locations", &self.locations)
            .field("entry_points", &self.entry_point_names())
            .field("has_backend", &self.backend.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use modkit_core::{ResourceMod, TypeName};

    use super::*;
    use crate::classpath::ModClassPath;
    use crate::loader::ModLoader;

    struct Source;

    impl ArtifactSource for Source {
        fn load_raw_artifact(&self, name: &str) -> ModResult<Vec<u8>> {
            match name {
                "pkg.Foo" | "data/icons.png" => Ok(name.as_bytes().to_vec()),
                "pkg.Broken" => Err(ModError::Io(std::io::Error::other("disk gone"))),
                _ => Err(ModError::not_found(NotFoundKind::Artifact, name)),
            }
        }
    }

    struct Upper;

    impl ResourceMod for Upper {
        fn hooks_resource(&self, resource_name: &str) -> bool {
            resource_name.ends_with(".png")
        }

        fn redefine_resource_stream(
            &self,
            _resource_name: &str,
            stream: &mut ResourceStream,
        ) -> Option<ResourceStream> {
            let mut buf = Vec::new();
            stream.read_to_end(&mut buf).ok()?;
            Some(Box::new(Cursor::new(buf.to_ascii_uppercase())))
        }
    }

    impl Mod for Upper {
        fn declared_type(&self) -> TypeName {
            TypeName::from_static("mod.Upper")
        }

        fn as_resource_mod(self: Arc<Self>) -> Option<Arc<dyn ResourceMod>> {
            Some(self)
        }
    }

    fn runtime() -> ModRuntime {
        let mut class_path = ModClassPath::new();
        class_path.insert_entry_point("app.Fails", |_: &ModRuntime, _: &[String]| {
            Err(ModError::in_mod("app", "exit 1"))
        });
        let mut loader = ModLoader::new(class_path, Arc::new(Source));
        loader.register_mod(Arc::new(Upper));
        loader.freeze()
    }

    #[test]
    fn unhooked_class_passes_through() {
        let runtime = runtime();
        assert!(!runtime.hooks_class("pkg.Foo"));
        assert_eq!(runtime.redefine_class("pkg.Foo").unwrap(), b"pkg.Foo");
    }

    #[test]
    fn missing_unhooked_class_is_not_found() {
        let err = runtime().redefine_class("pkg.Nope").unwrap_err();
        assert!(err.is_not_found(NotFoundKind::Artifact));
    }

    #[test]
    fn source_errors_propagate() {
        let err = runtime().redefine_class("pkg.Broken").unwrap_err();
        assert!(matches!(err, ModError::Io(_)));
    }

    #[test]
    fn resources_are_transformed_on_open() {
        let runtime = runtime();
        assert!(runtime.hooks_resource("data/icons.png"));
        let mut out = String::new();
        runtime
            .open_resource("data/icons.png")
            .unwrap()
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "DATA/ICONS.PNG");
    }

    #[test]
    fn entry_point_failures_are_wrapped() {
        let err = runtime().run_entry_point("app.Fails", &[]).unwrap_err();
        assert!(matches!(err, ModError::EntryPoint { ref name, .. } if name == "app.Fails"));
        assert!(err.to_string().contains("exit 1"));
    }

    #[test]
    fn runtime_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ModRuntime>();
        assert!(runtime().find_mod::<Upper>().is_some());
    }
}
