//! Built-in class replacement and augmentation mods.
//!
//! Both are plain class mods over the host pair. They only decide *what*
//! to rewrite; the rewriting is delegated to the [`BytecodeBackend`]
//! carried by the [`ClassContext`].
//!
//! [`BytecodeBackend`]: modkit_core::BytecodeBackend

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use modkit_core::{
    CLASS_MOD_CONTRACT, ClassBytes, ClassContext, ClassHook, ClassMod, ErasedView, Mod, ModError,
    ModResult, TypeDecl, TypeName, TypeRef,
};
use tracing::debug;

use crate::classpath::ModClass;
use crate::scanner::ManifestEntry;

/// Declared type of [`ClassReplacement`].
pub const CLASS_REPLACEMENT: TypeName = TypeName::from_static("modkit.ClassReplacement");

/// Declared type of [`ClassAugmentation`].
pub const CLASS_AUGMENTATION: TypeName = TypeName::from_static("modkit.ClassAugmentation");

/// Load priority of [`ClassReplacement`]. Replacements must run first.
pub const CLASS_REPLACEMENT_PRIORITY: i32 = -1000;

/// Load priority of [`ClassAugmentation`].
pub const CLASS_AUGMENTATION_PRIORITY: i32 = -100;

fn host_class_mod_decl(name: TypeName) -> TypeDecl {
    TypeDecl::new(name).implements(TypeRef::applied(
        CLASS_MOD_CONTRACT,
        [TypeRef::of::<ClassBytes>(), TypeRef::of::<ClassContext>()],
    ))
}

// ---------------------------------------------------------------------------
// ClassReplacement
// ---------------------------------------------------------------------------

/// Swaps whole class definitions for the definition of another class.
#[derive(Default)]
pub struct ClassReplacement {
    /// Replaced class → replacement class.
    replacements: DashMap<String, String>,
}

impl ClassReplacement {
    /// Create an instance with no replacements.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `replaced` with the definition of `replacement`.
    ///
    /// A later call for the same `replaced` class wins.
    pub fn replace_class(&self, replaced: impl Into<String>, replacement: impl Into<String>) {
        let (replaced, replacement) = (replaced.into(), replacement.into());
        debug!(replaced = %replaced, replacement = %replacement, "Registered class replacement");
        self.replacements.insert(replaced, replacement);
    }

    /// The replacement registered for `replaced`.
    #[must_use]
    pub fn replacement_for(&self, replaced: &str) -> Option<String> {
        self.replacements.get(replaced).map(|r| r.value().clone())
    }
}

impl ClassHook for ClassReplacement {
    fn hooks_class(&self, class_name: &str) -> bool {
        self.replacements.contains_key(class_name)
    }
}

impl ClassMod<ClassBytes, ClassContext> for ClassReplacement {
    fn redefine_class(
        &self,
        class_name: &str,
        _current: Option<&ClassBytes>,
        ctx: &ClassContext,
    ) -> ModResult<Option<ClassBytes>> {
        let Some(replacement) = self.replacement_for(class_name) else {
            return Ok(None);
        };
        let raw = ctx.source().load_raw_artifact(&replacement)?;
        ctx.backend()?
            .retarget(&raw, &replacement, class_name)
            .map(Some)
    }
}

impl Mod for ClassReplacement {
    fn declared_type(&self) -> TypeName {
        CLASS_REPLACEMENT
    }

    fn as_class_hook(&self) -> Option<&dyn ClassHook> {
        Some(self)
    }

    fn class_view(self: Arc<Self>) -> Option<ErasedView> {
        Some(ErasedView::class_mod::<ClassBytes, ClassContext>(self))
    }
}

impl fmt::Debug for ClassReplacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassReplacement")
            .field("replacements", &self.replacements.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ClassAugmentation
// ---------------------------------------------------------------------------

/// Merges the members of augmentation classes into existing classes.
#[derive(Default)]
pub struct ClassAugmentation {
    /// Augmented class → augmentation classes, in registration order.
    augmentations: DashMap<String, Vec<String>>,
}

impl ClassAugmentation {
    /// Create an instance with no augmentations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `augmentation` into `augmented` whenever it is defined.
    pub fn augment_class(&self, augmented: impl Into<String>, augmentation: impl Into<String>) {
        let (augmented, augmentation) = (augmented.into(), augmentation.into());
        debug!(augmented = %augmented, augmentation = %augmentation, "Registered class augmentation");
        self.augmentations
            .entry(augmented)
            .or_default()
            .push(augmentation);
    }

    /// Augmentations registered for `augmented`, in order.
    #[must_use]
    pub fn augmentations_for(&self, augmented: &str) -> Vec<String> {
        self.augmentations
            .get(augmented)
            .map(|a| a.value().clone())
            .unwrap_or_default()
    }
}

impl ClassHook for ClassAugmentation {
    fn hooks_class(&self, class_name: &str) -> bool {
        self.augmentations.contains_key(class_name)
    }
}

impl ClassMod<ClassBytes, ClassContext> for ClassAugmentation {
    fn redefine_class(
        &self,
        class_name: &str,
        current: Option<&ClassBytes>,
        ctx: &ClassContext,
    ) -> ModResult<Option<ClassBytes>> {
        let augmentations = self.augmentations_for(class_name);
        if augmentations.is_empty() {
            return Ok(None);
        }
        let Some(current) = current else {
            return Err(ModError::DefinitionUnavailable {
                name: class_name.to_owned(),
            });
        };

        let backend = ctx.backend()?;
        let mut patched = current.clone();
        for augmentation in &augmentations {
            let raw = ctx.source().load_raw_artifact(augmentation)?;
            patched = backend.augment(&patched, class_name, &raw, augmentation)?;
        }
        Ok(Some(patched))
    }
}

impl Mod for ClassAugmentation {
    fn declared_type(&self) -> TypeName {
        CLASS_AUGMENTATION
    }

    fn as_class_hook(&self) -> Option<&dyn ClassHook> {
        Some(self)
    }

    fn class_view(self: Arc<Self>) -> Option<ErasedView> {
        Some(ErasedView::class_mod::<ClassBytes, ClassContext>(self))
    }
}

impl fmt::Debug for ClassAugmentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassAugmentation")
            .field("augmented", &self.augmentations.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Built-in bundle
// ---------------------------------------------------------------------------

/// Built-in mod classes, seeded into every class path.
pub(crate) fn classes() -> Vec<ModClass> {
    vec![
        ModClass::new(host_class_mod_decl(CLASS_REPLACEMENT))
            .with_priority(CLASS_REPLACEMENT_PRIORITY)
            .constructor(|| Ok(ClassReplacement::new())),
        ModClass::new(host_class_mod_decl(CLASS_AUGMENTATION))
            .with_priority(CLASS_AUGMENTATION_PRIORITY)
            .constructor(|| Ok(ClassAugmentation::new())),
    ]
}

/// Manifest entries of the built-in bundle.
pub(crate) fn manifest_entries() -> Vec<ManifestEntry> {
    [CLASS_REPLACEMENT, CLASS_AUGMENTATION]
        .into_iter()
        .map(|name| ManifestEntry {
            class: name.to_string(),
            priority: None,
        })
        .collect()
}
