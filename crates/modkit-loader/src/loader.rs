//! The mod loader while mods are still being registered.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use modkit_config::Config;
use modkit_core::{
    ArtifactSource, BytecodeBackend, Mod, ModError, ModRegistry, ModResult, NotFoundKind,
    RegisteredMod, TypeDecl,
};
use tracing::{debug, info};

use crate::api::ModApi;
use crate::builtins::{CLASS_AUGMENTATION, CLASS_REPLACEMENT, ClassAugmentation, ClassReplacement};
use crate::classpath::{EntryPoint, ModClass, ModClassPath};
use crate::construct::construct;
use crate::discovery::{DiscoveryService, FsDiscovery, ModLocation};
use crate::patch::PatchPass;
use crate::runtime::ModRuntime;
use crate::scanner::{ManifestScanner, ModScanner};

/// Discovers, constructs and registers mods, then hands over to a
/// [`ModRuntime`].
///
/// Mods are registered through `&mut self` during a single-threaded start-up
/// phase; [`start`](Self::start) consumes the loader, so registration can
/// never interleave with artifact requests.
pub struct ModLoader {
    registry: ModRegistry,
    classes: HashMap<String, ModClass>,
    entry_points: HashMap<String, EntryPoint>,
    source: Arc<dyn ArtifactSource>,
    backend: Option<Arc<dyn BytecodeBackend>>,
    discovery: Option<Box<dyn DiscoveryService>>,
    scanner: Option<Box<dyn ModScanner>>,
    patch_passes: Vec<Box<dyn PatchPass>>,
    args: Vec<String>,
    config: Config,
    locations: Vec<ModLocation>,
}

impl ModLoader {
    /// Create a loader over `class_path`, reading original artifacts from
    /// `source`.
    #[must_use]
    pub fn new(class_path: ModClassPath, source: Arc<dyn ArtifactSource>) -> Self {
        let ModClassPath {
            catalog,
            classes,
            entry_points,
        } = class_path;
        Self {
            registry: ModRegistry::with_catalog(catalog),
            classes,
            entry_points,
            source,
            backend: None,
            discovery: None,
            scanner: None,
            patch_passes: Vec::new(),
            args: Vec::new(),
            config: Config::default(),
            locations: Vec::new(),
        }
    }

    /// Install the bytecode backend used by the built-in mods.
    #[must_use]
    pub fn with_backend(mut self, backend: Arc<dyn BytecodeBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Use `config` instead of the defaults.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Replace the default [`FsDiscovery`].
    #[must_use]
    pub fn with_discovery(mut self, discovery: impl DiscoveryService + 'static) -> Self {
        self.discovery = Some(Box::new(discovery));
        self
    }

    /// Replace the default [`ManifestScanner`].
    #[must_use]
    pub fn with_scanner(mut self, scanner: impl ModScanner + 'static) -> Self {
        self.scanner = Some(Box::new(scanner));
        self
    }

    /// Add a patching pass run by [`start`](Self::start).
    #[must_use]
    pub fn with_patch_pass(mut self, pass: impl PatchPass + 'static) -> Self {
        self.patch_passes.push(Box::new(pass));
        self
    }

    /// Set the launch arguments handed to mod construction shapes.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    /// Launch arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Locations found by the last discovery run.
    #[must_use]
    pub fn mod_locations(&self) -> &[ModLocation] {
        &self.locations
    }

    /// The registry being built.
    #[must_use]
    pub fn registry(&self) -> &ModRegistry {
        &self.registry
    }

    /// The loader configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A mod class on the class path.
    #[must_use]
    pub fn mod_class(&self, name: &str) -> Option<&ModClass> {
        self.classes.get(name)
    }

    /// Add a type declaration (an adapter, a contract) after construction.
    ///
    /// # Errors
    ///
    /// See [`modkit_core::TypeCatalog::declare`].
    pub fn declare(&mut self, decl: TypeDecl) -> ModResult<()> {
        self.registry.declare(decl)
    }

    // -----------------------------------------------------------------
    // Discovery and registration
    // -----------------------------------------------------------------

    /// Run discovery, replacing the known locations.
    pub fn discover(&mut self) -> &[ModLocation] {
        let discovery = self
            .discovery
            .take()
            .unwrap_or_else(|| Box::new(FsDiscovery::from_config(&self.config.loader)));
        self.locations = discovery.find_mod_artifacts();
        self.discovery = Some(discovery);
        &self.locations
    }

    /// Discover bundles and register every mod they name.
    ///
    /// # Errors
    ///
    /// Returns whatever the scanner cannot contain. Per-mod failures are
    /// logged, not returned.
    pub fn init(&mut self) -> ModResult<()> {
        self.discover();

        let scanner = self
            .scanner
            .take()
            .unwrap_or_else(|| Box::new(ManifestScanner::from_config(&self.config.loader)));
        let result = scanner.scan_for_mods(self);
        self.scanner = Some(scanner);

        info!(mods = self.registry.len(), "Mod loader initialized");
        result
    }

    /// Register an already constructed mod.
    pub fn register_mod<M: Mod>(&mut self, instance: Arc<M>) -> Arc<M> {
        let erased: Arc<dyn Mod> = Arc::clone(&instance) as Arc<dyn Mod>;
        self.registry.register(erased);
        instance
    }

    /// Construct the mod class `name` and register it.
    ///
    /// For each signature, most specific first (concrete loader + args,
    /// [`ModApi`] + args, nothing), the static factory is tried, then the
    /// constructor. Constructors are only tried for classes implementing
    /// `modkit.Mod`. The first shape that succeeds wins.
    ///
    /// # Errors
    ///
    /// Returns [`ModError::NotFound`] if `name` is not on the class path, or
    /// [`ModError::ConstructionFailure`] if every shape failed. Nothing is
    /// registered in either case.
    pub fn register_mod_by_name(&mut self, name: &str) -> ModResult<RegisteredMod> {
        let class = self
            .classes
            .get(name)
            .ok_or_else(|| ModError::not_found(NotFoundKind::ModClass, name))?;
        let instance = construct(class, self.registry.catalog(), self)?;
        debug!(class = name, "Constructed mod from class path");
        Ok(self.registry.register(instance))
    }

    /// Define `replaced` with the definition of `replacement`.
    ///
    /// # Errors
    ///
    /// Returns [`ModError::NotFound`] if the built-in replacement mod is not
    /// registered.
    pub fn replace_class(&self, replaced: &str, replacement: &str) -> ModResult<()> {
        self.registry
            .find_mod::<ClassReplacement>()
            .ok_or_else(|| ModError::not_found(NotFoundKind::Mod, CLASS_REPLACEMENT.as_str()))?
            .replace_class(replaced, replacement);
        Ok(())
    }

    /// Merge the members of `augmentation` into `augmented`.
    ///
    /// # Errors
    ///
    /// Returns [`ModError::NotFound`] if the built-in augmentation mod is
    /// not registered.
    pub fn augment_class(&self, augmented: &str, augmentation: &str) -> ModResult<()> {
        self.registry
            .find_mod::<ClassAugmentation>()
            .ok_or_else(|| ModError::not_found(NotFoundKind::Mod, CLASS_AUGMENTATION.as_str()))?
            .augment_class(augmented, augmentation);
        Ok(())
    }

    // -----------------------------------------------------------------
    // Hand-over
    // -----------------------------------------------------------------

    /// End registration and build the runtime. No patching pass runs.
    #[must_use]
    pub fn freeze(self) -> ModRuntime {
        ModRuntime {
            registry: self.registry.freeze(),
            source: self.source,
            backend: self.backend,
            entry_points: self.entry_points,
            locations: self.locations,
            args: self.args,
            config: self.config,
        }
    }

    /// Freeze, run every patching pass, then invoke the entry point.
    ///
    /// `main` falls back to `loader.main` from the configuration; with
    /// neither set, no entry point runs. `args` are handed to the entry
    /// point.
    ///
    /// # Errors
    ///
    /// Returns the first patching error, [`ModError::NotFound`] if the entry
    /// point is unknown, or [`ModError::EntryPoint`] if it fails.
    pub fn start(mut self, main: Option<&str>, args: &[String]) -> ModResult<Arc<ModRuntime>> {
        let main = main
            .map(str::to_owned)
            .or_else(|| self.config.loader.main.clone());
        let patch_passes = std::mem::take(&mut self.patch_passes);
        let runtime = Arc::new(self.freeze());

        // 1. Classes, for every pass.
        for pass in &patch_passes {
            debug!(pass = pass.name(), "Patching classes");
            pass.patch_classes(&runtime)?;
        }

        // 2. Resources, for every pass.
        for pass in &patch_passes {
            debug!(pass = pass.name(), "Patching resources");
            pass.patch_resources(&runtime)?;
        }

        // 3. Entry point.
        if let Some(main) = main {
            runtime.run_entry_point(&main, args)?;
        }

        Ok(runtime)
    }
}

impl ModApi for ModLoader {
    fn args(&self) -> &[String] {
        &self.args
    }

    fn mod_locations(&self) -> &[ModLocation] {
        &self.locations
    }

    fn registry(&self) -> &ModRegistry {
        &self.registry
    }

    fn config(&self) -> &Config {
        &self.config
    }
}

impl fmt::Debug for ModLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut classes: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        classes.sort_unstable();
        f.debug_struct("ModLoader")
            .field("registry", &self.registry)
            .field("classes", &classes)
            .field("locations", &self.locations)
            .field("has_backend", &self.backend.is_some())
            .field("patch_passes", &self.patch_passes.len())
            .finish_non_exhaustive()
    }
}
