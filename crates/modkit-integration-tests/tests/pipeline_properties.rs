//! Properties of the transformation pipeline as seen through the runtime.

use std::sync::Arc;

use modkit_core::{
    ADAPTER_CONTRACT, CLASS_MOD_CONTRACT, ClassAdapter, ClassBytes, ClassContext, ClassHook,
    ClassMod, ErasedView, Mod, ModError, ModResult, TypeDecl, TypeName, TypeRef,
};
use modkit_test::{
    ClassAction, FailingLifecycleMod, MemoryArtifactSource, ResourceAction, ScriptedClassMod,
    ScriptedResourceMod, register_class_mod, register_resource_mod, test_loader,
};

#[test]
fn transformers_that_do_not_hook_are_never_invoked() {
    let mut loader =
        test_loader(MemoryArtifactSource::new().with_artifact("pkg.Foo", b"x".to_vec()));
    let foo = register_class_mod(
        &mut loader,
        ScriptedClassMod::augmenter("t.Foo", "pkg.Foo", 1),
    );
    let bar = register_class_mod(
        &mut loader,
        ScriptedClassMod::replacer("t.Bar", "pkg.Bar", b"B"),
    );

    let runtime = loader.freeze();
    runtime.redefine_class("pkg.Foo").unwrap();
    runtime.redefine_class("pkg.Foo").unwrap();

    assert_eq!(foo.calls(), 2);
    assert_eq!(bar.calls(), 0);
}

#[test]
fn unhooked_names_pass_through_unchanged() {
    let mut loader =
        test_loader(MemoryArtifactSource::new().with_artifact("pkg.Plain", b"plain".to_vec()));
    register_class_mod(&mut loader, ScriptedClassMod::replacer("t.Foo", "pkg.Foo", b"F"));

    let runtime = loader.freeze();
    assert!(!runtime.hooks_class("pkg.Plain"));
    assert_eq!(runtime.redefine_class("pkg.Plain").unwrap(), b"plain");
}

#[test]
fn a_later_supplier_satisfies_an_earlier_needy_transformer() {
    let mut loader = test_loader(MemoryArtifactSource::new());
    let needy = register_class_mod(
        &mut loader,
        ScriptedClassMod::new("t.Needy", &["pkg.New"], ClassAction::NeedsDefinition(9)),
    );
    register_class_mod(&mut loader, ScriptedClassMod::replacer("t.Supplier", "pkg.New", b"S"));

    let runtime = loader.freeze();
    assert_eq!(runtime.redefine_class("pkg.New").unwrap(), b"S");
    assert_eq!(needy.seen(), [None]);
}

#[test]
fn keeping_after_a_replacement_keeps_the_replacement() {
    let mut loader = test_loader(MemoryArtifactSource::new());
    register_class_mod(&mut loader, ScriptedClassMod::replacer("t.Replacer", "pkg.Foo", b"R"));
    register_class_mod(&mut loader, ScriptedClassMod::null("t.Null", "pkg.Foo"));

    let runtime = loader.freeze();
    assert_eq!(runtime.redefine_class("pkg.Foo").unwrap(), b"R");
}

#[test]
fn a_failing_transformer_fails_only_its_request() {
    let mut loader = test_loader(
        MemoryArtifactSource::new()
            .with_artifact("pkg.Foo", b"foo".to_vec())
            .with_artifact("pkg.Bar", b"bar".to_vec()),
    );
    register_class_mod(
        &mut loader,
        ScriptedClassMod::new("t.Broken", &["pkg.Foo"], ClassAction::Fail("boom".to_owned())),
    );

    let runtime = loader.freeze();
    let err = runtime.redefine_class("pkg.Foo").unwrap_err();
    assert!(matches!(err, ModError::Mod { ref message, .. } if message == "boom"));
    assert_eq!(runtime.redefine_class("pkg.Bar").unwrap(), b"bar");
}

#[test]
fn registration_order_is_kept_per_list() {
    let mut loader = test_loader(MemoryArtifactSource::new());
    let a = ScriptedResourceMod::new("t.A", "r", ResourceAction::Decline);
    let b = ScriptedClassMod::replacer("t.B", "pkg.B", b"b");
    let c = ScriptedResourceMod::new("t.C", "r", ResourceAction::Replace(b"c".to_vec()));
    register_resource_mod(&mut loader, a);
    register_class_mod(&mut loader, b);
    register_resource_mod(&mut loader, c);

    let registry = loader.registry();
    let all: Vec<&str> = registry.mods().iter().map(|m| m.declared_type().as_str()).collect();
    assert_eq!(all, ["t.A", "t.B", "t.C"]);
    let resource: Vec<&str> = registry
        .mods()
        .iter()
        .filter(|m| m.is_resource_mod())
        .map(|m| m.declared_type().as_str())
        .collect();
    assert_eq!(resource, ["t.A", "t.C"]);
    assert_eq!(registry.resource_mods().len(), 2);
    assert_eq!(registry.class_mods().len(), 1);
}

#[test]
fn failing_registration_hook_still_registers() {
    let mut loader = test_loader(MemoryArtifactSource::new());
    let failing = FailingLifecycleMod::new("t.Failing");
    loader.declare(failing.decl()).unwrap();
    loader.register_mod(failing);

    let registry = loader.registry();
    assert_eq!(registry.len(), 1);
    assert!(registry.find_mod::<FailingLifecycleMod>().is_some());
}

// ---------------------------------------------------------------------------
// Adapters
// ---------------------------------------------------------------------------

const TEXT_MOD: TypeName = TypeName::from_static("ext.TextMod");
const TEXT_MOD_BYTES: TypeName = TypeName::from_static("ext.TextMod.Bytes");

/// Transforms text natively and class bytes through a nested adapter.
struct TextMod;

struct TextModBytes;

impl ClassHook for TextMod {
    fn hooks_class(&self, class_name: &str) -> bool {
        class_name.starts_with("pkg.Text")
    }
}

impl ClassMod<String, ()> for TextMod {
    fn redefine_class(
        &self,
        class_name: &str,
        _current: Option<&String>,
        _ctx: &(),
    ) -> ModResult<Option<String>> {
        Ok(Some(format!("text for {class_name}")))
    }
}

impl ClassAdapter<ClassBytes, ClassContext> for TextModBytes {
    fn redefine_class(
        &self,
        class_name: &str,
        _current: Option<&ClassBytes>,
        _ctx: &ClassContext,
    ) -> ModResult<Option<ClassBytes>> {
        Ok(Some(format!("bytes for {class_name}").into_bytes()))
    }
}

impl Mod for TextMod {
    fn declared_type(&self) -> TypeName {
        TEXT_MOD
    }

    fn as_class_hook(&self) -> Option<&dyn ClassHook> {
        Some(self)
    }

    fn class_view(self: Arc<Self>) -> Option<ErasedView> {
        Some(ErasedView::class_mod::<String, ()>(self))
    }

    fn adapter_view(self: Arc<Self>, adapter: &TypeName) -> Option<ErasedView> {
        (*adapter == TEXT_MOD_BYTES)
            .then(|| ErasedView::adapter::<ClassBytes, ClassContext>(Arc::new(TextModBytes)))
    }
}

fn text_mod_decls() -> [TypeDecl; 2] {
    [
        TypeDecl::new(TEXT_MOD)
            .implements(TypeRef::applied(
                CLASS_MOD_CONTRACT,
                [TypeRef::of::<String>(), TypeRef::of::<()>()],
            ))
            .nest(TEXT_MOD_BYTES),
        TypeDecl::new(TEXT_MOD_BYTES).implements(TypeRef::applied(
            ADAPTER_CONTRACT,
            [TypeRef::of::<ClassBytes>(), TypeRef::of::<ClassContext>()],
        )),
    ]
}

#[test]
fn nested_adapter_serves_the_host_pair() {
    let mut loader = test_loader(MemoryArtifactSource::new());
    for decl in text_mod_decls() {
        loader.declare(decl).unwrap();
    }
    loader.register_mod(Arc::new(TextMod));
    assert!(loader.registry().mods()[0].is_class_mod());

    let runtime = loader.freeze();
    assert!(runtime.hooks_class("pkg.TextLabel"));
    assert!(!runtime.hooks_class("pkg.Other"));
    assert_eq!(
        runtime.redefine_class("pkg.TextLabel").unwrap(),
        b"bytes for pkg.TextLabel"
    );
}

#[test]
fn adapting_twice_behaves_identically() {
    let mut loader = test_loader(MemoryArtifactSource::new());
    for decl in text_mod_decls() {
        loader.declare(decl).unwrap();
    }
    let registered = loader.register_mod(Arc::new(TextMod));
    let instance: Arc<dyn Mod> = registered;

    let registry = loader.registry();
    let first = registry.adapt::<ClassBytes, ClassContext>(&instance).unwrap();
    let second = registry.adapt::<ClassBytes, ClassContext>(&instance).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    for name in ["pkg.Text", "pkg.TextArea", "pkg.Other", ""] {
        assert_eq!(first.hooks_class(name), second.hooks_class(name));
    }

    let own = registry.adapt::<String, ()>(&instance).unwrap();
    assert_eq!(
        own.redefine_class("pkg.Text", None, &()).unwrap().as_deref(),
        Some("text for pkg.Text")
    );
}

#[test]
fn unsupported_pair_is_no_capability() {
    let mut loader = test_loader(MemoryArtifactSource::new());
    for decl in text_mod_decls() {
        loader.declare(decl).unwrap();
    }
    let text_mod: Arc<TextMod> = loader.register_mod(Arc::new(TextMod));
    let instance: Arc<dyn Mod> = text_mod;

    let err = loader
        .registry()
        .adapt::<u32, ()>(&instance)
        .err()
        .unwrap();
    assert!(matches!(err, ModError::NoCapability { ref mod_type, .. } if *mod_type == TEXT_MOD));
}
