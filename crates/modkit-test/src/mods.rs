//! Scripted mods.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use modkit_core::{
    CLASS_MOD_CONTRACT, ClassBytes, ClassContext, ClassHook, ClassMod, ErasedView, MOD_CONTRACT,
    Mod, ModError, ModRegistry, ModResult, RESOURCE_MOD_CONTRACT, ResourceMod, ResourceStream,
    TypeDecl, TypeName, TypeRef,
};

/// What a [`ScriptedClassMod`] does with a hooked class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassAction {
    /// Replace the definition with these bytes.
    Replace(Vec<u8>),
    /// Append a byte to the current definition (nothing if there is none).
    Append(u8),
    /// Return `None`.
    Keep,
    /// Fail with `DefinitionUnavailable` when there is no definition,
    /// otherwise append like [`ClassAction::Append`].
    NeedsDefinition(u8),
    /// Fail with a mod error.
    Fail(String),
}

/// A class mod over the host pair whose behavior is fixed up front.
#[derive(Debug)]
pub struct ScriptedClassMod {
    name: TypeName,
    hooks: Vec<String>,
    action: ClassAction,
    calls: AtomicUsize,
    seen: Mutex<Vec<Option<ClassBytes>>>,
}

impl ScriptedClassMod {
    /// Create a mod declared as `name`, hooking `hooks`.
    #[must_use]
    pub fn new(name: impl Into<String>, hooks: &[&str], action: ClassAction) -> Arc<Self> {
        Arc::new(Self {
            name: TypeName::new(name),
            hooks: hooks.iter().map(|h| (*h).to_owned()).collect(),
            action,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    /// Replaces `hook` with `bytes`.
    #[must_use]
    pub fn replacer(name: impl Into<String>, hook: &str, bytes: &[u8]) -> Arc<Self> {
        Self::new(name, &[hook], ClassAction::Replace(bytes.to_vec()))
    }

    /// Appends `byte` to `hook`.
    #[must_use]
    pub fn augmenter(name: impl Into<String>, hook: &str, byte: u8) -> Arc<Self> {
        Self::new(name, &[hook], ClassAction::Append(byte))
    }

    /// Hooks `hook` and never produces anything.
    #[must_use]
    pub fn null(name: impl Into<String>, hook: &str) -> Arc<Self> {
        Self::new(name, &[hook], ClassAction::Keep)
    }

    /// The type declaration this mod needs in the catalog.
    #[must_use]
    pub fn decl(&self) -> TypeDecl {
        TypeDecl::new(self.name.clone()).implements(TypeRef::applied(
            CLASS_MOD_CONTRACT,
            [TypeRef::of::<ClassBytes>(), TypeRef::of::<ClassContext>()],
        ))
    }

    /// How many times `redefine_class` ran.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The `current` definition of every call, in order.
    #[must_use]
    pub fn seen(&self) -> Vec<Option<ClassBytes>> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl ClassHook for ScriptedClassMod {
    fn hooks_class(&self, class_name: &str) -> bool {
        self.hooks.iter().any(|h| h == class_name)
    }
}

impl ClassMod<ClassBytes, ClassContext> for ScriptedClassMod {
    fn redefine_class(
        &self,
        class_name: &str,
        current: Option<&ClassBytes>,
        _ctx: &ClassContext,
    ) -> ModResult<Option<ClassBytes>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(current.cloned());
        }

        match &self.action {
            ClassAction::Replace(bytes) => Ok(Some(bytes.clone())),
            ClassAction::Append(byte) => Ok(current.map(|c| {
                let mut next = c.clone();
                next.push(*byte);
                next
            })),
            ClassAction::Keep => Ok(None),
            ClassAction::NeedsDefinition(byte) => {
                let Some(current) = current else {
                    return Err(ModError::DefinitionUnavailable {
                        name: class_name.to_owned(),
                    });
                };
                let mut next = current.clone();
                next.push(*byte);
                Ok(Some(next))
            },
            ClassAction::Fail(message) => Err(ModError::in_mod(self.name.as_str(), message.clone())),
        }
    }
}

impl Mod for ScriptedClassMod {
    fn declared_type(&self) -> TypeName {
        self.name.clone()
    }

    fn as_class_hook(&self) -> Option<&dyn ClassHook> {
        Some(self)
    }

    fn class_view(self: Arc<Self>) -> Option<ErasedView> {
        Some(ErasedView::class_mod::<ClassBytes, ClassContext>(self))
    }
}

/// What a [`ScriptedResourceMod`] does with a hooked resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceAction {
    /// Replace the stream with one over these bytes.
    Replace(Vec<u8>),
    /// Return `None` (no change).
    Decline,
}

/// A resource mod whose behavior is fixed up front.
#[derive(Debug)]
pub struct ScriptedResourceMod {
    name: TypeName,
    hook: String,
    action: ResourceAction,
    calls: AtomicUsize,
}

impl ScriptedResourceMod {
    /// Create a mod declared as `name`, hooking `hook`.
    #[must_use]
    pub fn new(name: impl Into<String>, hook: &str, action: ResourceAction) -> Arc<Self> {
        Arc::new(Self {
            name: TypeName::new(name),
            hook: hook.to_owned(),
            action,
            calls: AtomicUsize::new(0),
        })
    }

    /// The type declaration of this mod.
    #[must_use]
    pub fn decl(&self) -> TypeDecl {
        TypeDecl::new(self.name.clone()).implements(TypeRef::Named(RESOURCE_MOD_CONTRACT))
    }

    /// How many times `redefine_resource_stream` ran.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ResourceMod for ScriptedResourceMod {
    fn hooks_resource(&self, resource_name: &str) -> bool {
        resource_name == self.hook
    }

    fn redefine_resource_stream(
        &self,
        _resource_name: &str,
        _stream: &mut ResourceStream,
    ) -> Option<ResourceStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.action {
            ResourceAction::Replace(bytes) => Some(Box::new(Cursor::new(bytes.clone()))),
            ResourceAction::Decline => None,
        }
    }
}

impl Mod for ScriptedResourceMod {
    fn declared_type(&self) -> TypeName {
        self.name.clone()
    }

    fn as_resource_mod(self: Arc<Self>) -> Option<Arc<dyn ResourceMod>> {
        Some(self)
    }
}

/// A plain mod whose registration hook always fails.
#[derive(Debug)]
pub struct FailingLifecycleMod {
    name: TypeName,
}

impl FailingLifecycleMod {
    /// Create a mod declared as `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: TypeName::new(name),
        })
    }

    /// The type declaration of this mod.
    #[must_use]
    pub fn decl(&self) -> TypeDecl {
        TypeDecl::new(self.name.clone()).implements(TypeRef::Named(MOD_CONTRACT))
    }
}

impl Mod for FailingLifecycleMod {
    fn declared_type(&self) -> TypeName {
        self.name.clone()
    }

    fn on_registered(&self, _registry: &ModRegistry) -> ModResult<()> {
        Err(ModError::in_mod(self.name.as_str(), "refusing to initialize"))
    }
}
