//! Transformation pipeline.
//!
//! Threads one artifact through every transformer that hooks its name, in
//! list order. Each transformer sees the output of the ones before it.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::artifact::ResourceStream;
use crate::contract::{ClassMod, ResourceMod};
use crate::error::{ModError, ModResult};

/// Apply class transformers to `artifact`.
///
/// A transformer returning `None` keeps the current artifact. A transformer
/// failing with [`ModError::DefinitionUnavailable`] is skipped while no
/// artifact exists yet. If at least one transformer hooked `name` and no
/// artifact came out, the request fails with [`ModError::UnsatisfiedHook`].
/// If none hooked it, `artifact` is returned as it came in.
///
/// # Errors
///
/// Returns [`ModError::UnsatisfiedHook`] as described above, or the first
/// error a transformer raises.
pub fn apply_class_mods<T, C>(
    mods: &[Arc<dyn ClassMod<T, C>>],
    name: &str,
    artifact: Option<T>,
    ctx: &C,
) -> ModResult<Option<T>> {
    let mut current = artifact;
    let mut hooked_by: usize = 0;

    for class_mod in mods {
        if !class_mod.hooks_class(name) {
            continue;
        }
        hooked_by = hooked_by.saturating_add(1);

        match class_mod.redefine_class(name, current.as_ref(), ctx) {
            Ok(Some(next)) => current = Some(next),
            Ok(None) => trace!(name, "Transformer kept the current definition"),
            Err(ModError::DefinitionUnavailable { .. }) if current.is_none() => {
                debug!(name, "Transformer needs a definition that does not exist yet, skipping");
            },
            Err(e) => return Err(e),
        }
    }

    if hooked_by > 0 && current.is_none() {
        return Err(ModError::UnsatisfiedHook {
            name: name.to_string(),
            hooked_by,
        });
    }
    Ok(current)
}

/// Apply resource transformers to `stream`.
///
/// Never fails: a transformer returning `None` leaves the stream unchanged.
pub fn apply_resource_mods(
    mods: &[Arc<dyn ResourceMod>],
    name: &str,
    stream: ResourceStream,
) -> ResourceStream {
    let mut current = stream;
    for resource_mod in mods {
        if !resource_mod.hooks_resource(name) {
            continue;
        }
        if let Some(next) = resource_mod.redefine_resource_stream(name, &mut current) {
            current = next;
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::contract::ClassHook;

    /// Scripted transformer over `Vec<u8>` with a unit context.
    struct Step {
        hook: &'static str,
        action: Action,
        calls: AtomicUsize,
    }

    enum Action {
        Replace(Vec<u8>),
        Append(u8),
        Keep,
        NeedsDefinition,
        Fail,
    }

    impl Step {
        fn new(hook: &'static str, action: Action) -> Arc<Self> {
            Arc::new(Self {
                hook,
                action,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ClassHook for Step {
        fn hooks_class(&self, class_name: &str) -> bool {
            class_name == self.hook
        }
    }

    impl ClassMod<Vec<u8>, ()> for Step {
        fn redefine_class(
            &self,
            class_name: &str,
            current: Option<&Vec<u8>>,
            _ctx: &(),
        ) -> ModResult<Option<Vec<u8>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.action {
                Action::Replace(bytes) => Ok(Some(bytes.clone())),
                Action::Append(byte) => match current {
                    Some(def) => {
                        let mut next = def.clone();
                        next.push(*byte);
                        Ok(Some(next))
                    },
                    None => Err(ModError::DefinitionUnavailable {
                        name: class_name.to_string(),
                    }),
                },
                Action::Keep => Ok(None),
                Action::NeedsDefinition => Err(ModError::DefinitionUnavailable {
                    name: class_name.to_string(),
                }),
                Action::Fail => Err(ModError::in_mod("Step", "boom")),
            }
        }
    }

    fn chain(steps: &[Arc<Step>]) -> Vec<Arc<dyn ClassMod<Vec<u8>, ()>>> {
        steps
            .iter()
            .map(|s| Arc::clone(s) as Arc<dyn ClassMod<Vec<u8>, ()>>)
            .collect()
    }

    #[test]
    fn replacement_then_augmentation_compose_in_order() {
        let replace = Step::new("pkg.Foo", Action::Replace(b"R1".to_vec()));
        let augment = Step::new("pkg.Foo", Action::Append(0x01));
        let out = apply_class_mods(&chain(&[replace, augment]), "pkg.Foo", None, &()).unwrap();
        assert_eq!(out, Some(b"R1\x01".to_vec()));
    }

    #[test]
    fn non_hooking_transformers_are_never_invoked() {
        let other = Step::new("pkg.Other", Action::Fail);
        let out = apply_class_mods(
            &chain(&[Arc::clone(&other)]),
            "pkg.Foo",
            Some(b"orig".to_vec()),
            &(),
        )
        .unwrap();
        assert_eq!(out, Some(b"orig".to_vec()));
        assert_eq!(other.calls(), 0);
    }

    #[test]
    fn unhooked_absent_artifact_passes_through() {
        let other = Step::new("pkg.Other", Action::Keep);
        let out = apply_class_mods(&chain(&[other]), "pkg.Foo", None, &()).unwrap();
        assert_eq!(out, None);
    }

    #[test]
    fn keep_preserves_the_current_definition() {
        let keep = Step::new("pkg.Foo", Action::Keep);
        let out = apply_class_mods(&chain(&[keep]), "pkg.Foo", Some(vec![7]), &()).unwrap();
        assert_eq!(out, Some(vec![7]));
    }

    #[test]
    fn hooked_without_result_is_unsatisfied() {
        let keep = Step::new("pkg.Bar", Action::Keep);
        let needs = Step::new("pkg.Bar", Action::NeedsDefinition);
        let err = apply_class_mods(&chain(&[keep, needs]), "pkg.Bar", None, &()).unwrap_err();
        match err {
            ModError::UnsatisfiedHook { name, hooked_by } => {
                assert_eq!(name, "pkg.Bar");
                assert_eq!(hooked_by, 2);
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_definition_is_tolerated_until_a_later_supplier() {
        let augment = Step::new("pkg.Foo", Action::Append(9));
        let replace = Step::new("pkg.Foo", Action::Replace(vec![1]));
        let out = apply_class_mods(
            &chain(&[Arc::clone(&augment), replace]),
            "pkg.Foo",
            None,
            &(),
        )
        .unwrap();
        assert_eq!(out, Some(vec![1]));
        assert_eq!(augment.calls(), 1);
    }

    #[test]
    fn definition_unavailable_with_a_definition_is_an_error() {
        let needs = Step::new("pkg.Foo", Action::NeedsDefinition);
        let err = apply_class_mods(&chain(&[needs]), "pkg.Foo", Some(vec![1]), &()).unwrap_err();
        assert!(matches!(err, ModError::DefinitionUnavailable { .. }));
    }

    #[test]
    fn transformer_errors_abort_the_request() {
        let fail = Step::new("pkg.Foo", Action::Fail);
        let after = Step::new("pkg.Foo", Action::Replace(vec![2]));
        let err = apply_class_mods(
            &chain(&[fail, Arc::clone(&after)]),
            "pkg.Foo",
            Some(vec![1]),
            &(),
        )
        .unwrap_err();
        assert!(matches!(err, ModError::Mod { .. }));
        assert_eq!(after.calls(), 0);
    }

    struct Res {
        hook: &'static str,
        replacement: Option<&'static [u8]>,
    }

    impl ResourceMod for Res {
        fn hooks_resource(&self, resource_name: &str) -> bool {
            resource_name == self.hook
        }

        fn redefine_resource_stream(
            &self,
            _resource_name: &str,
            _stream: &mut ResourceStream,
        ) -> Option<ResourceStream> {
            self.replacement
                .map(|bytes| Box::new(Cursor::new(bytes)) as ResourceStream)
        }
    }

    fn read_all(mut stream: ResourceStream) -> Vec<u8> {
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).unwrap();
        buf
    }

    #[test]
    fn declining_resource_mod_leaves_stream_untouched() {
        let mods: Vec<Arc<dyn ResourceMod>> = vec![Arc::new(Res {
            hook: "data/icons.png",
            replacement: None,
        })];
        let out = apply_resource_mods(&mods, "data/icons.png", Box::new(Cursor::new(b"png")));
        assert_eq!(read_all(out), b"png");
    }

    #[test]
    fn last_hooking_resource_mod_wins() {
        let mods: Vec<Arc<dyn ResourceMod>> = vec![
            Arc::new(Res {
                hook: "a.txt",
                replacement: Some(b"first"),
            }),
            Arc::new(Res {
                hook: "b.txt",
                replacement: Some(b"other"),
            }),
            Arc::new(Res {
                hook: "a.txt",
                replacement: Some(b"second"),
            }),
        ];
        let out = apply_resource_mods(&mods, "a.txt", Box::new(Cursor::new(b"orig")));
        assert_eq!(read_all(out), b"second");
    }
}
