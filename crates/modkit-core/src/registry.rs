//! Mod registry.
//!
//! Registration happens in a single-threaded startup phase against a
//! [`ModRegistry`]. Once every mod is in, [`ModRegistry::freeze`] turns it
//! into a [`FrozenRegistry`] that is read-only and safe to share between
//! concurrent artifact requests.
//!
//! Every list keeps registration order. Priority is applied by whoever
//! registers, never by the registry.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::adapter::CapabilityAdapter;
use crate::artifact::{ClassBytes, ClassContext};
use crate::catalog::{CLASS_MOD_CONTRACT, TypeCatalog};
use crate::contract::{ClassMod, Mod, ResourceMod};
use crate::error::ModResult;
use crate::types::{TypeDecl, TypeName};

/// Class transformer over the host's artifact pair.
pub type HostClassMod = Arc<dyn ClassMod<ClassBytes, ClassContext>>;

/// Handle to a registered mod and the roles it was classified into.
#[derive(Clone)]
pub struct RegisteredMod {
    instance: Arc<dyn Mod>,
    declared_type: TypeName,
    is_class_mod: bool,
    is_resource_mod: bool,
}

impl RegisteredMod {
    /// The mod instance.
    #[must_use]
    pub fn instance(&self) -> &Arc<dyn Mod> {
        &self.instance
    }

    /// The mod's declared type.
    #[must_use]
    pub fn declared_type(&self) -> &TypeName {
        &self.declared_type
    }

    /// Whether the mod joined the class transformer list.
    #[must_use]
    pub fn is_class_mod(&self) -> bool {
        self.is_class_mod
    }

    /// Whether the mod joined the resource transformer list.
    #[must_use]
    pub fn is_resource_mod(&self) -> bool {
        self.is_resource_mod
    }

    /// Downcast the instance to its concrete type.
    #[must_use]
    pub fn downcast<M: Mod>(&self) -> Option<Arc<M>> {
        let any: Arc<dyn Any + Send + Sync> = self.instance.clone();
        any.downcast::<M>().ok()
    }
}

impl fmt::Debug for RegisteredMod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredMod")
            .field("declared_type", &self.declared_type)
            .field("is_class_mod", &self.is_class_mod)
            .field("is_resource_mod", &self.is_resource_mod)
            .finish_non_exhaustive()
    }
}

/// Registry under construction.
pub struct ModRegistry {
    catalog: TypeCatalog,
    adapter: CapabilityAdapter,
    mods: Vec<RegisteredMod>,
    class_mods: Vec<HostClassMod>,
    resource_mods: Vec<Arc<dyn ResourceMod>>,
}

impl ModRegistry {
    /// Create an empty registry over a fresh catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::with_catalog(TypeCatalog::new())
    }

    /// Create an empty registry over an existing catalog.
    #[must_use]
    pub fn with_catalog(catalog: TypeCatalog) -> Self {
        Self {
            catalog,
            adapter: CapabilityAdapter::new(),
            mods: Vec::new(),
            class_mods: Vec::new(),
            resource_mods: Vec::new(),
        }
    }

    /// The type catalog mods are classified against.
    #[must_use]
    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Add a type declaration to the catalog.
    ///
    /// # Errors
    ///
    /// See [`TypeCatalog::declare`].
    pub fn declare(&mut self, decl: TypeDecl) -> ModResult<()> {
        self.catalog.declare(decl)
    }

    /// Register a mod.
    ///
    /// The mod's `on_registered` hook runs first; a failing hook is logged
    /// and the mod is registered anyway. A class mod whose declaration does
    /// not fit the host pair is kept in the mod list but skipped as a
    /// transformer. So is a mod that exposes class hooks while its declared
    /// type is missing from the catalog or does not extend `ClassMod`; that
    /// case is logged as a warning.
    pub fn register(&mut self, instance: Arc<dyn Mod>) -> RegisteredMod {
        let declared_type = instance.declared_type();

        if let Err(e) = instance.on_registered(self) {
            warn!(
                mod_type = %declared_type,
                error = %e,
                "Mod failed during registration, ignoring"
            );
        }

        let resource_mod = Arc::clone(&instance).as_resource_mod();
        let is_resource_mod = resource_mod.is_some();
        if let Some(resource_mod) = resource_mod {
            self.resource_mods.push(resource_mod);
        }

        let mut is_class_mod = false;
        if self.catalog.is_assignable(&declared_type, &CLASS_MOD_CONTRACT) {
            match self.adapt::<ClassBytes, ClassContext>(&instance) {
                Ok(view) => {
                    self.class_mods.push(view);
                    is_class_mod = true;
                },
                Err(e) => debug!(
                    mod_type = %declared_type,
                    error = %e,
                    "Skipping class mod registration (not supported by this host)"
                ),
            }
        } else if instance.as_class_hook().is_some() {
            warn!(
                mod_type = %declared_type,
                declared = self.catalog.contains(&declared_type),
                "Mod hooks classes but is not declared as a class mod, ignoring its class hooks"
            );
        }

        let registered = RegisteredMod {
            instance,
            declared_type,
            is_class_mod,
            is_resource_mod,
        };
        info!(
            mod_type = %registered.declared_type,
            class_mod = is_class_mod,
            resource_mod = is_resource_mod,
            "Registered mod"
        );
        self.mods.push(registered.clone());
        registered
    }

    /// View a mod as a transformer for `(T, C)`.
    ///
    /// # Errors
    ///
    /// Returns [`ModError::NoCapability`](crate::ModError::NoCapability) if the
    /// mod cannot serve the pair.
    pub fn adapt<T: 'static, C: 'static>(
        &self,
        instance: &Arc<dyn Mod>,
    ) -> ModResult<Arc<dyn ClassMod<T, C>>> {
        self.adapter.adapt::<T, C>(&self.catalog, instance)
    }

    /// Registered mods, in registration order.
    #[must_use]
    pub fn mods(&self) -> &[RegisteredMod] {
        &self.mods
    }

    /// Class transformers for the host pair, in registration order.
    #[must_use]
    pub fn class_mods(&self) -> &[HostClassMod] {
        &self.class_mods
    }

    /// Resource transformers, in registration order.
    #[must_use]
    pub fn resource_mods(&self) -> &[Arc<dyn ResourceMod>] {
        &self.resource_mods
    }

    /// Number of registered mods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mods.len()
    }

    /// Whether nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }

    // -----------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------

    /// First registered mod matching `predicate`.
    pub fn find(&self, predicate: impl FnMut(&&RegisteredMod) -> bool) -> Option<&RegisteredMod> {
        self.mods.iter().find(predicate)
    }

    /// First registered mod whose concrete type is `M`.
    #[must_use]
    pub fn find_mod<M: Mod>(&self) -> Option<Arc<M>> {
        find_mod(&self.mods)
    }

    /// First registered mod whose declared type is exactly `name`.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&RegisteredMod> {
        self.find(|m| m.declared_type.as_str() == name)
    }

    /// First registered mod of declared type `name`, or of any subtype
    /// unless `exact` is set.
    #[must_use]
    pub fn find_by_type(&self, name: &TypeName, exact: bool) -> Option<&RegisteredMod> {
        find_by_type(&self.catalog, &self.mods, name, exact)
    }

    /// Whether any class transformer hooks `class_name`.
    #[must_use]
    pub fn hooks_class(&self, class_name: &str) -> bool {
        self.class_mods.iter().any(|m| m.hooks_class(class_name))
    }

    /// Whether any resource transformer hooks `resource_name`.
    #[must_use]
    pub fn hooks_resource(&self, resource_name: &str) -> bool {
        self.resource_mods
            .iter()
            .any(|m| m.hooks_resource(resource_name))
    }

    /// End the registration phase.
    #[must_use]
    pub fn freeze(self) -> FrozenRegistry {
        info!(
            mods = self.mods.len(),
            class_mods = self.class_mods.len(),
            resource_mods = self.resource_mods.len(),
            "Froze mod registry"
        );
        FrozenRegistry {
            catalog: self.catalog,
            mods: self.mods,
            class_mods: self.class_mods,
            resource_mods: self.resource_mods,
        }
    }
}

impl Default for ModRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModRegistry")
            .field("mods", &self.mods)
            .field("class_mods", &self.class_mods.len())
            .field("resource_mods", &self.resource_mods.len())
            .field("adapter", &self.adapter)
            .finish_non_exhaustive()
    }
}

/// Read-only registry, shared by concurrent artifact requests.
pub struct FrozenRegistry {
    catalog: TypeCatalog,
    mods: Vec<RegisteredMod>,
    class_mods: Vec<HostClassMod>,
    resource_mods: Vec<Arc<dyn ResourceMod>>,
}

impl FrozenRegistry {
    /// The type catalog.
    #[must_use]
    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Registered mods, in registration order.
    #[must_use]
    pub fn mods(&self) -> &[RegisteredMod] {
        &self.mods
    }

    /// Class transformers for the host pair, in registration order.
    #[must_use]
    pub fn class_mods(&self) -> &[HostClassMod] {
        &self.class_mods
    }

    /// Resource transformers, in registration order.
    #[must_use]
    pub fn resource_mods(&self) -> &[Arc<dyn ResourceMod>] {
        &self.resource_mods
    }

    /// See [`ModRegistry::find`].
    pub fn find(&self, predicate: impl FnMut(&&RegisteredMod) -> bool) -> Option<&RegisteredMod> {
        self.mods.iter().find(predicate)
    }

    /// See [`ModRegistry::find_mod`].
    #[must_use]
    pub fn find_mod<M: Mod>(&self) -> Option<Arc<M>> {
        find_mod(&self.mods)
    }

    /// See [`ModRegistry::find_by_name`].
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&RegisteredMod> {
        self.find(|m| m.declared_type.as_str() == name)
    }

    /// See [`ModRegistry::find_by_type`].
    #[must_use]
    pub fn find_by_type(&self, name: &TypeName, exact: bool) -> Option<&RegisteredMod> {
        find_by_type(&self.catalog, &self.mods, name, exact)
    }

    /// Whether any class transformer hooks `class_name`.
    #[must_use]
    pub fn hooks_class(&self, class_name: &str) -> bool {
        self.class_mods.iter().any(|m| m.hooks_class(class_name))
    }

    /// Whether any resource transformer hooks `resource_name`.
    #[must_use]
    pub fn hooks_resource(&self, resource_name: &str) -> bool {
        self.resource_mods
            .iter()
            .any(|m| m.hooks_resource(resource_name))
    }
}

impl fmt::Debug for FrozenRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrozenRegistry")
            .field("mods", &self.mods)
            .field("class_mods", &self.class_mods.len())
            .field("resource_mods", &self.resource_mods.len())
            .finish_non_exhaustive()
    }
}

fn find_mod<M: Mod>(mods: &[RegisteredMod]) -> Option<Arc<M>> {
    mods.iter().find_map(RegisteredMod::downcast::<M>)
}

fn find_by_type<'a>(
    catalog: &TypeCatalog,
    mods: &'a [RegisteredMod],
    name: &TypeName,
    exact: bool,
) -> Option<&'a RegisteredMod> {
    mods.iter().find(|m| {
        if exact {
            m.declared_type == *name
        } else {
            catalog.is_assignable(&m.declared_type, name)
        }
    })
}
