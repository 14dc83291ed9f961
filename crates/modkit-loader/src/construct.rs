//! The flexible construction protocol.
//!
//! For each signature, most specific first, the static factory is tried
//! before the constructor. Constructors are only considered for classes
//! that implement `modkit.Mod`; a factory-only class need not. Missing
//! shapes are skipped silently, failing shapes are recorded, and the first
//! success wins.

use std::sync::Arc;

use modkit_core::{MOD_CONTRACT, Mod, ModError, ModResult, TypeCatalog};
use tracing::debug;

use crate::classpath::{ModClass, ShapeKind, Signature};
use crate::loader::ModLoader;

/// Shapes in the order they are tried for one signature.
const KINDS: [ShapeKind; 2] = [ShapeKind::Factory, ShapeKind::Constructor];

/// Build one instance of `class`.
pub(crate) fn construct(
    class: &ModClass,
    catalog: &TypeCatalog,
    loader: &ModLoader,
) -> ModResult<Arc<dyn Mod>> {
    let implements_mod = catalog.is_assignable(class.name(), &MOD_CONTRACT);
    let mut attempts = Vec::new();

    for signature in Signature::ALL {
        for kind in KINDS {
            if kind == ShapeKind::Constructor && !implements_mod {
                continue;
            }
            let Some(build) = class.find_shape(kind, signature) else {
                continue;
            };

            let shape = format!("{kind}{signature}");
            match build.invoke(loader) {
                Ok(instance) => {
                    debug!(class = %class.name(), shape = %shape, "Constructed mod");
                    return Ok(instance);
                },
                Err(e) => {
                    debug!(
                        class = %class.name(),
                        shape = %shape,
                        error = %e,
                        "Construction shape failed"
                    );
                    attempts.push(format!("{shape} threw: {e}"));
                },
            }
        }
    }

    Err(ModError::ConstructionFailure {
        class: class.name().to_string(),
        attempts,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use modkit_core::{TypeDecl, TypeName, TypeRef};

    use super::*;
    use crate::api::ModApi;
    use crate::classpath::ModClassPath;

    struct Built(&'static str);

    impl Mod for Built {
        fn declared_type(&self) -> TypeName {
            TypeName::from_static("pkg.Built")
        }
    }

    fn loader() -> ModLoader {
        ModLoader::new(ModClassPath::new(), Arc::new(NoSource))
    }

    struct NoSource;

    impl modkit_core::ArtifactSource for NoSource {
        fn load_raw_artifact(&self, name: &str) -> ModResult<Vec<u8>> {
            Err(ModError::not_found(modkit_core::NotFoundKind::Artifact, name))
        }
    }

    fn tag(instance: &Arc<dyn Mod>) -> &'static str {
        let any: Arc<dyn std::any::Any + Send + Sync> = instance.clone();
        any.downcast::<Built>().map_or("?", |b| b.0)
    }

    fn mod_decl() -> TypeDecl {
        TypeDecl::new("pkg.Built").implements(TypeRef::Named(MOD_CONTRACT))
    }

    fn catalog_with(decl: TypeDecl) -> TypeCatalog {
        let mut catalog = TypeCatalog::new();
        catalog.declare(decl).unwrap();
        catalog
    }

    #[test]
    fn loader_factory_wins_over_everything() {
        let class = ModClass::new(mod_decl())
            .constructor(|| Ok(Built("ctor()")))
            .factory(|| Ok(Arc::new(Built("factory()")) as Arc<dyn Mod>))
            .factory_with_loader(|_: &ModLoader, _: &[String]| {
                Ok(Arc::new(Built("factory(loader)")) as Arc<dyn Mod>)
            });
        let loader = loader();
        let instance = construct(&class, &catalog_with(mod_decl()), &loader).unwrap();
        assert_eq!(tag(&instance), "factory(loader)");
    }

    #[test]
    fn constructor_of_a_signature_beats_factories_of_later_ones() {
        let class = ModClass::new(mod_decl())
            .factory(|| Ok(Arc::new(Built("factory()")) as Arc<dyn Mod>))
            .constructor_with_api(|_: &dyn ModApi, _: &[String]| Ok(Built("ctor(api)")));
        let loader = loader();
        let instance = construct(&class, &catalog_with(mod_decl()), &loader).unwrap();
        assert_eq!(tag(&instance), "ctor(api)");
    }

    #[test]
    fn failing_shapes_fall_through_in_order() {
        let tried = Arc::new(Mutex::new(Vec::new()));
        let (a, b) = (Arc::clone(&tried), Arc::clone(&tried));
        let class = ModClass::new(mod_decl())
            .factory_with_loader(move |_: &ModLoader, _: &[String]| {
                a.lock().unwrap().push("factory(loader)");
                Err(ModError::in_mod("pkg.Built", "boom"))
            })
            .constructor_with_loader(move |_: &ModLoader, _: &[String]| -> ModResult<Built> {
                b.lock().unwrap().push("ctor(loader)");
                Err(ModError::in_mod("pkg.Built", "bang"))
            })
            .constructor(|| Ok(Built("ctor()")));
        let loader = loader();
        let instance = construct(&class, &catalog_with(mod_decl()), &loader).unwrap();
        assert_eq!(tag(&instance), "ctor()");
        assert_eq!(*tried.lock().unwrap(), ["factory(loader)", "ctor(loader)"]);
    }

    #[test]
    fn constructors_are_skipped_for_non_mod_classes() {
        let decl = TypeDecl::new("pkg.Plain");
        let class = ModClass::new(decl.clone()).constructor(|| Ok(Built("ctor()")));
        let loader = loader();
        let err = construct(&class, &catalog_with(decl), &loader).unwrap_err();
        match err {
            ModError::ConstructionFailure { class, attempts } => {
                assert_eq!(class, "pkg.Plain");
                assert!(attempts.is_empty());
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn exhausted_shapes_report_every_attempt() {
        let class = ModClass::new(mod_decl())
            .factory(|| Err(ModError::in_mod("pkg.Built", "no")))
            .constructor(|| -> ModResult<Built> { Err(ModError::in_mod("pkg.Built", "never")) });
        let loader = loader();
        let err = construct(&class, &catalog_with(mod_decl()), &loader).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("no valid constructor signatures for pkg.Built"));
        assert!(message.contains("newInstance() threw"));
        assert!(message.contains("new() threw"));
    }
}
