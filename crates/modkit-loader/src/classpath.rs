//! The host-compiled set of mod classes and entry points.
//!
//! A [`ModClass`] is what `register_mod_by_name` resolves a name to: the
//! class's type declaration, its declared load priority, and whichever
//! construction shapes it offers. Shapes are keyed by [`ShapeKind`]
//! (static factory or constructor) and [`Signature`] (what the shape is
//! handed); see [`ModLoader::register_mod_by_name`] for the order they are
//! tried in.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use modkit_core::{Mod, ModResult, TypeCatalog, TypeDecl, TypeName};
use tracing::warn;

use crate::api::ModApi;
use crate::builtins;
use crate::loader::ModLoader;
use crate::runtime::ModRuntime;

/// Builds a mod from the concrete loader and the launch arguments.
pub type LoaderBuild = Box<dyn Fn(&ModLoader, &[String]) -> ModResult<Arc<dyn Mod>> + Send + Sync>;

/// Builds a mod from the base loader interface and the launch arguments.
pub type ApiBuild = Box<dyn Fn(&dyn ModApi, &[String]) -> ModResult<Arc<dyn Mod>> + Send + Sync>;

/// Builds a mod from nothing.
pub type PlainBuild = Box<dyn Fn() -> ModResult<Arc<dyn Mod>> + Send + Sync>;

/// A main entry point, run once the patching passes are done.
pub type EntryPoint = Arc<dyn Fn(&ModRuntime, &[String]) -> ModResult<()> + Send + Sync>;

/// Static factory or ordinary constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// A static factory; may return any mod.
    Factory,
    /// A constructor; only tried for classes that implement `modkit.Mod`.
    Constructor,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Factory => "newInstance",
            Self::Constructor => "new",
        })
    }
}

/// What a construction shape is handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signature {
    /// The concrete loader plus launch arguments.
    Loader,
    /// The base loader interface plus launch arguments.
    Api,
    /// Nothing.
    NoArgs,
}

impl Signature {
    /// Every signature, most specific first.
    pub const ALL: [Self; 3] = [Self::Loader, Self::Api, Self::NoArgs];
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Loader => "(ModLoader, args)",
            Self::Api => "(ModApi, args)",
            Self::NoArgs => "()",
        })
    }
}

pub(crate) enum Build {
    Loader(LoaderBuild),
    Api(ApiBuild),
    NoArgs(PlainBuild),
}

impl Build {
    fn signature(&self) -> Signature {
        match self {
            Self::Loader(_) => Signature::Loader,
            Self::Api(_) => Signature::Api,
            Self::NoArgs(_) => Signature::NoArgs,
        }
    }

    pub(crate) fn invoke(&self, loader: &ModLoader) -> ModResult<Arc<dyn Mod>> {
        match self {
            Self::Loader(build) => build(loader, loader.args()),
            Self::Api(build) => build(loader, loader.args()),
            Self::NoArgs(build) => build(),
        }
    }
}

/// A mod class on the class path.
pub struct ModClass {
    decl: TypeDecl,
    priority: Option<i32>,
    shapes: Vec<(ShapeKind, Build)>,
}

impl ModClass {
    /// Start a class with no construction shapes.
    #[must_use]
    pub fn new(decl: TypeDecl) -> Self {
        Self {
            decl,
            priority: None,
            shapes: Vec::new(),
        }
    }

    /// Declare the class's load priority (lower loads earlier).
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Add a static factory taking the concrete loader.
    #[must_use]
    pub fn factory_with_loader<F>(self, factory: F) -> Self
    where
        F: Fn(&ModLoader, &[String]) -> ModResult<Arc<dyn Mod>> + Send + Sync + 'static,
    {
        self.shape(ShapeKind::Factory, Build::Loader(Box::new(factory)))
    }

    /// Add a static factory taking the base loader interface.
    #[must_use]
    pub fn factory_with_api<F>(self, factory: F) -> Self
    where
        F: Fn(&dyn ModApi, &[String]) -> ModResult<Arc<dyn Mod>> + Send + Sync + 'static,
    {
        self.shape(ShapeKind::Factory, Build::Api(Box::new(factory)))
    }

    /// Add a static factory taking nothing.
    #[must_use]
    pub fn factory<F>(self, factory: F) -> Self
    where
        F: Fn() -> ModResult<Arc<dyn Mod>> + Send + Sync + 'static,
    {
        self.shape(ShapeKind::Factory, Build::NoArgs(Box::new(factory)))
    }

    /// Add a constructor taking the concrete loader.
    #[must_use]
    pub fn constructor_with_loader<M, F>(self, constructor: F) -> Self
    where
        M: Mod,
        F: Fn(&ModLoader, &[String]) -> ModResult<M> + Send + Sync + 'static,
    {
        self.shape(
            ShapeKind::Constructor,
            Build::Loader(Box::new(move |loader: &ModLoader, args: &[String]| {
                constructor(loader, args).map(|m| Arc::new(m) as Arc<dyn Mod>)
            })),
        )
    }

    /// Add a constructor taking the base loader interface.
    #[must_use]
    pub fn constructor_with_api<M, F>(self, constructor: F) -> Self
    where
        M: Mod,
        F: Fn(&dyn ModApi, &[String]) -> ModResult<M> + Send + Sync + 'static,
    {
        self.shape(
            ShapeKind::Constructor,
            Build::Api(Box::new(move |api: &dyn ModApi, args: &[String]| {
                constructor(api, args).map(|m| Arc::new(m) as Arc<dyn Mod>)
            })),
        )
    }

    /// Add a constructor taking nothing.
    #[must_use]
    pub fn constructor<M, F>(self, constructor: F) -> Self
    where
        M: Mod,
        F: Fn() -> ModResult<M> + Send + Sync + 'static,
    {
        self.shape(
            ShapeKind::Constructor,
            Build::NoArgs(Box::new(move || {
                constructor().map(|m| Arc::new(m) as Arc<dyn Mod>)
            })),
        )
    }

    fn shape(mut self, kind: ShapeKind, build: Build) -> Self {
        let signature = build.signature();
        self.shapes
            .retain(|(k, b)| *k != kind || b.signature() != signature);
        self.shapes.push((kind, build));
        self
    }

    /// The class name.
    #[must_use]
    pub fn name(&self) -> &TypeName {
        &self.decl.name
    }

    /// The class's type declaration.
    #[must_use]
    pub fn decl(&self) -> &TypeDecl {
        &self.decl
    }

    /// The declared load priority, if any.
    #[must_use]
    pub fn priority(&self) -> Option<i32> {
        self.priority
    }

    /// Whether the class offers the given shape.
    #[must_use]
    pub fn has_shape(&self, kind: ShapeKind, signature: Signature) -> bool {
        self.find_shape(kind, signature).is_some()
    }

    pub(crate) fn find_shape(&self, kind: ShapeKind, signature: Signature) -> Option<&Build> {
        self.shapes
            .iter()
            .find(|(k, b)| *k == kind && b.signature() == signature)
            .map(|(_, b)| b)
    }
}

impl fmt::Debug for ModClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shapes: Vec<String> = self
            .shapes
            .iter()
            .map(|(kind, build)| format!("{kind}{}", build.signature()))
            .collect();
        f.debug_struct("ModClass")
            .field("name", &self.decl.name)
            .field("priority", &self.priority)
            .field("shapes", &shapes)
            .finish()
    }
}

/// Every mod class and entry point the host can resolve by name.
///
/// Seeded with the built-in replacement and augmentation mods.
pub struct ModClassPath {
    pub(crate) catalog: TypeCatalog,
    pub(crate) classes: HashMap<String, ModClass>,
    pub(crate) entry_points: HashMap<String, EntryPoint>,
}

impl ModClassPath {
    /// Create a class path holding only the built-in mods.
    #[must_use]
    pub fn new() -> Self {
        let mut class_path = Self {
            catalog: TypeCatalog::new(),
            classes: HashMap::new(),
            entry_points: HashMap::new(),
        };
        for class in builtins::classes() {
            let name = class.name().clone();
            if let Err(e) = class_path.insert(class) {
                warn!(class = %name, error = %e, "Failed to declare built-in mod class");
            }
        }
        class_path
    }

    /// Declare a non-mod type (an adapter, an abstract base, a contract).
    ///
    /// # Errors
    ///
    /// See [`TypeCatalog::declare`].
    pub fn declare(&mut self, decl: TypeDecl) -> ModResult<()> {
        self.catalog.declare(decl)
    }

    /// Add a mod class, declaring its type.
    ///
    /// # Errors
    ///
    /// See [`TypeCatalog::declare`].
    pub fn insert(&mut self, class: ModClass) -> ModResult<()> {
        self.catalog.declare(class.decl.clone())?;
        self.classes.insert(class.name().to_string(), class);
        Ok(())
    }

    /// Add a named main entry point.
    pub fn insert_entry_point<F>(&mut self, name: impl Into<String>, entry: F)
    where
        F: Fn(&ModRuntime, &[String]) -> ModResult<()> + Send + Sync + 'static,
    {
        self.entry_points.insert(name.into(), Arc::new(entry));
    }

    /// Look up a mod class.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModClass> {
        self.classes.get(name)
    }

    /// Whether a mod class exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// The type catalog, built-in contracts included.
    #[must_use]
    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Mod class names, sorted.
    #[must_use]
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Entry point names, sorted.
    #[must_use]
    pub fn entry_point_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entry_points.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ModClassPath {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModClassPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModClassPath")
            .field("classes", &self.class_names())
            .field("entry_points", &self.entry_point_names())
            .finish_non_exhaustive()
    }
}
