//! Capability adaptation.
//!
//! A mod that does not itself declare `ClassMod<T, C>` may still serve
//! `(T, C)` through one of its nested adapter types (types assignable to
//! `ClassMod.And`). The adapter does the transforming; the hook check is
//! forwarded to the enclosing mod through a non-owning association table.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::catalog::{ADAPTER_CONTRACT, TypeCatalog};
use crate::contract::{ClassAdapter, ClassHook, ClassMod, ErasedView, Mod};
use crate::error::{ModError, ModResult};
use crate::matcher::CapabilityMatcher;
use crate::types::TypeName;

/// Identity of one adapter instance in the association table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdapterId(u64);

impl fmt::Display for AdapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "adapter#{}", self.0)
    }
}

/// Weak adapter → base mod associations.
///
/// Entries never keep a base mod alive; once the base is dropped the adapter
/// hooks nothing.
#[derive(Default)]
pub struct AdapterAssociations {
    next_id: AtomicU64,
    bases: DashMap<AdapterId, Weak<dyn Mod>>,
}

impl AdapterAssociations {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new adapter derived from `base`.
    pub fn associate(&self, base: &Arc<dyn Mod>) -> AdapterId {
        let id = AdapterId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.bases.insert(id, Arc::downgrade(base));
        id
    }

    /// The base mod of an adapter, if it is still alive.
    #[must_use]
    pub fn base(&self, id: AdapterId) -> Option<Arc<dyn Mod>> {
        self.bases.get(&id).and_then(|base| base.upgrade())
    }

    /// Number of recorded adapters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    /// Whether no adapter has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}

impl fmt::Debug for AdapterAssociations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterAssociations")
            .field("adapter_count", &self.bases.len())
            .finish()
    }
}

/// Forwarding view over an adapter: transforms with the adapter, hooks with the base.
struct AdaptedClassMod<T, C> {
    id: AdapterId,
    inner: Arc<dyn ClassAdapter<T, C>>,
    associations: Arc<AdapterAssociations>,
}

impl<T, C> ClassHook for AdaptedClassMod<T, C> {
    fn hooks_class(&self, class_name: &str) -> bool {
        self.associations.base(self.id).is_some_and(|base| {
            base.as_class_hook()
                .is_some_and(|hook| hook.hooks_class(class_name))
        })
    }
}

impl<T, C> ClassMod<T, C> for AdaptedClassMod<T, C> {
    fn redefine_class(
        &self,
        class_name: &str,
        current: Option<&T>,
        ctx: &C,
    ) -> ModResult<Option<T>> {
        self.inner.redefine_class(class_name, current, ctx)
    }
}

struct CachedView {
    base: Weak<dyn Mod>,
    view: Arc<dyn Any + Send + Sync>,
}

type ViewKey = (usize, TypeName, TypeName);

/// Views mods as transformers for a requested (artifact, context) pair.
///
/// Resolved views are cached per (mod, pair), so asking twice yields the
/// same view and builds at most one adapter.
#[derive(Default)]
pub struct CapabilityAdapter {
    associations: Arc<AdapterAssociations>,
    cache: DashMap<ViewKey, CachedView>,
}

impl CapabilityAdapter {
    /// Create an adapter with its own association table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The adapter → base association table.
    #[must_use]
    pub fn associations(&self) -> &Arc<AdapterAssociations> {
        &self.associations
    }

    /// View `instance` as a `ClassMod<T, C>`.
    ///
    /// # Errors
    ///
    /// Returns [`ModError::NoCapability`] if neither the mod's own declared
    /// signature nor any of its nested adapters accepts `(T, C)`.
    pub fn adapt<T: 'static, C: 'static>(
        &self,
        catalog: &TypeCatalog,
        instance: &Arc<dyn Mod>,
    ) -> ModResult<Arc<dyn ClassMod<T, C>>> {
        let artifact = TypeName::of::<T>();
        let context = TypeName::of::<C>();
        let key: ViewKey = (
            Arc::as_ptr(instance).cast::<()>() as usize,
            artifact.clone(),
            context.clone(),
        );

        let cached = self.cache.get(&key).and_then(|entry| {
            if entry.base.ptr_eq(&Arc::downgrade(instance)) && entry.base.strong_count() > 0 {
                entry.view.downcast_ref::<Arc<dyn ClassMod<T, C>>>().cloned()
            } else {
                None
            }
        });
        if let Some(view) = cached {
            return Ok(view);
        }

        let view = self.resolve::<T, C>(catalog, instance, &artifact, &context)?;
        self.cache.insert(
            key,
            CachedView {
                base: Arc::downgrade(instance),
                view: Arc::new(Arc::clone(&view)),
            },
        );
        Ok(view)
    }

    fn resolve<T: 'static, C: 'static>(
        &self,
        catalog: &TypeCatalog,
        instance: &Arc<dyn Mod>,
        artifact: &TypeName,
        context: &TypeName,
    ) -> ModResult<Arc<dyn ClassMod<T, C>>> {
        let matcher = CapabilityMatcher::new(catalog);
        let declared = instance.declared_type();

        if matcher.matches(&declared, artifact, context) {
            if let Some(view) = Arc::clone(instance)
                .class_view()
                .and_then(ErasedView::into_class_mod::<T, C>)
            {
                return Ok(view);
            }
            warn!(
                mod_type = %declared,
                %artifact,
                %context,
                "Declared signature matches but the mod exposes no such view"
            );
        }

        let nested = catalog
            .get(&declared)
            .map(|decl| decl.nested.as_slice())
            .unwrap_or_default();
        for adapter_type in nested {
            if !catalog.is_assignable(adapter_type, &ADAPTER_CONTRACT)
                || !matcher.matches(adapter_type, artifact, context)
            {
                continue;
            }
            let Some(inner) = Arc::clone(instance)
                .adapter_view(adapter_type)
                .and_then(ErasedView::into_adapter::<T, C>)
            else {
                warn!(
                    mod_type = %declared,
                    adapter = %adapter_type,
                    "Adapter is declared but the mod did not build it"
                );
                continue;
            };
            let id = self.associations.associate(instance);
            debug!(
                mod_type = %declared,
                adapter = %adapter_type,
                adapter_id = %id,
                "Built capability adapter"
            );
            return Ok(Arc::new(AdaptedClassMod {
                id,
                inner,
                associations: Arc::clone(&self.associations),
            }));
        }

        Err(ModError::NoCapability {
            mod_type: declared,
            artifact: artifact.clone(),
            context: context.clone(),
        })
    }
}

impl fmt::Debug for CapabilityAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityAdapter")
            .field("associations", &self.associations)
            .field("cached_views", &self.cache.len())
            .finish()
    }
}
