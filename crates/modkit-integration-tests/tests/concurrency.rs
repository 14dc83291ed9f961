//! A frozen runtime shared by concurrent artifact requests.

use std::sync::Arc;

use modkit_test::{
    MemoryArtifactSource, ScriptedClassMod, register_class_mod, test_loader,
};

#[test]
fn concurrent_readers_see_the_same_chain() {
    let mut loader = test_loader(
        MemoryArtifactSource::new()
            .with_artifact("pkg.Foo", b"foo".to_vec())
            .with_artifact("pkg.Plain", b"plain".to_vec()),
    );
    register_class_mod(&mut loader, ScriptedClassMod::replacer("t.R", "pkg.Foo", b"R1"));
    let augmenter =
        register_class_mod(&mut loader, ScriptedClassMod::augmenter("t.A", "pkg.Foo", 7));
    let runtime = Arc::new(loader.freeze());

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let runtime = Arc::clone(&runtime);
            scope.spawn(move || {
                for _ in 0..50 {
                    assert_eq!(runtime.redefine_class("pkg.Foo").unwrap(), b"R1\x07");
                    assert_eq!(runtime.redefine_class("pkg.Plain").unwrap(), b"plain");
                    assert!(runtime.hooks_class("pkg.Foo"));
                }
            });
        }
    });

    assert_eq!(augmenter.calls(), 400);
}
