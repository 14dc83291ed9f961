//! Mod contracts.
//!
//! A mod is one opaque unit implementing [`Mod`]. What else it can do is
//! exposed through tagged capability accessors on that trait, resolved once
//! when the mod is registered:
//!
//! - [`Mod::as_resource_mod`]: the mod rewrites resource streams
//! - [`Mod::as_class_hook`] + [`Mod::class_view`]: the mod rewrites class
//!   definitions for the pair named in its declared [`ClassMod`] signature
//! - [`Mod::adapter_view`]: the mod builds one of its nested adapter types
//!   to serve another pair
//!
//! The generic [`ClassMod`] views cross the non-generic `Mod` boundary as
//! [`ErasedView`]s, and are recovered by the capability adapter after the
//! declared signature has been checked.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::artifact::ResourceStream;
use crate::error::ModResult;
use crate::registry::ModRegistry;
use crate::types::TypeName;

/// An independently supplied plugin unit.
pub trait Mod: Any + Send + Sync {
    /// The declared type of this mod in the [`TypeCatalog`](crate::TypeCatalog).
    fn declared_type(&self) -> TypeName;

    /// Called once while the mod is being registered.
    ///
    /// Errors are logged and otherwise ignored: the mod is still registered.
    ///
    /// # Errors
    ///
    /// Implementations may fail; the registry contains the failure.
    fn on_registered(&self, _registry: &ModRegistry) -> ModResult<()> {
        Ok(())
    }

    /// This mod's class hook check, if it transforms class definitions.
    fn as_class_hook(&self) -> Option<&dyn ClassHook> {
        None
    }

    /// This mod as a resource transformer, if it is one.
    fn as_resource_mod(self: Arc<Self>) -> Option<Arc<dyn ResourceMod>> {
        None
    }

    /// This mod as the `ClassMod<T, C>` its declaration names.
    fn class_view(self: Arc<Self>) -> Option<ErasedView> {
        None
    }

    /// Build the nested adapter type `adapter`, bound to this mod.
    fn adapter_view(self: Arc<Self>, _adapter: &TypeName) -> Option<ErasedView> {
        None
    }
}

impl fmt::Debug for dyn Mod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mod")
            .field("declared_type", &self.declared_type())
            .finish_non_exhaustive()
    }
}

/// Declares which class names a transformer is willing to process.
pub trait ClassHook: Send + Sync {
    /// Whether this transformer wants to see `class_name`.
    fn hooks_class(&self, class_name: &str) -> bool;
}

/// A transformer of class artifacts of type `T` in context `C`.
pub trait ClassMod<T, C>: ClassHook {
    /// Produce a replacement for `current`.
    ///
    /// `current` is `None` when no definition exists yet. Returning
    /// `Ok(None)` keeps whatever the chain already has.
    ///
    /// # Errors
    ///
    /// [`ModError::DefinitionUnavailable`](crate::ModError::DefinitionUnavailable)
    /// signals that the transformer needs an existing definition; any other
    /// error aborts the request.
    fn redefine_class(&self, class_name: &str, current: Option<&T>, ctx: &C)
    -> ModResult<Option<T>>;
}

/// A nested adapter that serves a pair its enclosing mod does not declare.
///
/// Adapters only transform; whether a name is hooked is always answered by
/// the enclosing mod.
pub trait ClassAdapter<T, C>: Send + Sync {
    /// See [`ClassMod::redefine_class`].
    ///
    /// # Errors
    ///
    /// Same contract as [`ClassMod::redefine_class`].
    fn redefine_class(&self, class_name: &str, current: Option<&T>, ctx: &C)
    -> ModResult<Option<T>>;
}

/// A transformer of resource streams.
pub trait ResourceMod: Send + Sync {
    /// Whether this mod wants to see `resource_name`.
    fn hooks_resource(&self, resource_name: &str) -> bool;

    /// Produce a replacement stream, or `None` to leave `stream` as it is.
    fn redefine_resource_stream(
        &self,
        resource_name: &str,
        stream: &mut ResourceStream,
    ) -> Option<ResourceStream>;
}

/// A type-erased [`ClassMod`] or [`ClassAdapter`] handle.
pub struct ErasedView(Box<dyn Any + Send + Sync>);

impl ErasedView {
    /// Erase a class transformer view.
    #[must_use]
    pub fn class_mod<T: 'static, C: 'static>(view: Arc<dyn ClassMod<T, C>>) -> Self {
        Self(Box::new(view))
    }

    /// Erase an adapter view.
    #[must_use]
    pub fn adapter<T: 'static, C: 'static>(view: Arc<dyn ClassAdapter<T, C>>) -> Self {
        Self(Box::new(view))
    }

    pub(crate) fn into_class_mod<T: 'static, C: 'static>(self) -> Option<Arc<dyn ClassMod<T, C>>> {
        self.0
            .downcast::<Arc<dyn ClassMod<T, C>>>()
            .ok()
            .map(|view| *view)
    }

    pub(crate) fn into_adapter<T: 'static, C: 'static>(
        self,
    ) -> Option<Arc<dyn ClassAdapter<T, C>>> {
        self.0
            .downcast::<Arc<dyn ClassAdapter<T, C>>>()
            .ok()
            .map(|view| *view)
    }
}

impl fmt::Debug for ErasedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedView").finish_non_exhaustive()
    }
}
