//! Capability matching over declared generic signatures.
//!
//! A mod class can process `(A, C)` if, somewhere in its ancestry, it
//! implements `ClassMod<A, C>` once every type variable on the way up has
//! been replaced by what the subtype bound it to. For example
//!
//! ```text
//! Base<X, Y> implements ClassMod<X, Y>
//! Mid<Z>     extends Base<Z, pkg.Ctx>
//! Leaf       extends Mid<Vec<u8>>
//! ```
//!
//! makes `Leaf` a processor of `(Vec<u8>, pkg.Ctx)` and of nothing else.
//! The contract counts whether it is named as an interface or as the
//! superclass, matching what [`TypeCatalog::is_assignable`] reports.

use std::collections::HashMap;

use tracing::trace;

use crate::catalog::{CLASS_MOD_CONTRACT, TypeCatalog};
use crate::types::{TypeName, TypeRef};

type Bindings = HashMap<String, TypeRef>;

/// Decides whether a declared mod type can process an (artifact, context) pair.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityMatcher<'a> {
    catalog: &'a TypeCatalog,
}

impl<'a> CapabilityMatcher<'a> {
    /// Create a matcher over a catalog.
    #[must_use]
    pub fn new(catalog: &'a TypeCatalog) -> Self {
        Self { catalog }
    }

    /// Whether `candidate` implements `ClassMod<artifact, context>`.
    ///
    /// An undeclared candidate, or one with no matching ancestry, simply
    /// does not match.
    #[must_use]
    pub fn matches(&self, candidate: &TypeName, artifact: &TypeName, context: &TypeName) -> bool {
        let matched = self.accepts(candidate, artifact, context, &Bindings::new());
        trace!(%candidate, %artifact, %context, matched, "capability match");
        matched
    }

    /// Typed shorthand for [`matches`](Self::matches).
    #[must_use]
    pub fn matches_types<A: ?Sized, C: ?Sized>(&self, candidate: &TypeName) -> bool {
        self.matches(candidate, &TypeName::of::<A>(), &TypeName::of::<C>())
    }

    fn accepts(
        &self,
        candidate: &TypeName,
        artifact: &TypeName,
        context: &TypeName,
        bindings: &Bindings,
    ) -> bool {
        let Some(decl) = self.catalog.get(candidate) else {
            return false;
        };

        for contract in decl.supertypes() {
            if let TypeRef::Applied { base, args } = contract
                && *base == CLASS_MOD_CONTRACT
                && let [declared_artifact, declared_context] = args.as_slice()
                && substitute(declared_artifact, bindings).is_named(artifact)
                && substitute(declared_context, bindings).is_named(context)
            {
                return true;
            }
        }

        decl.supertypes().any(|supertype| match supertype {
            TypeRef::Named(raw) => self.accepts(raw, artifact, context, &Bindings::new()),
            TypeRef::Applied { base, args } => {
                let Some(super_decl) = self.catalog.get(base) else {
                    return false;
                };
                let super_bindings: Bindings = super_decl
                    .params
                    .iter()
                    .cloned()
                    .zip(args.iter().map(|arg| substitute(arg, bindings)))
                    .collect();
                self.accepts(base, artifact, context, &super_bindings)
            },
            TypeRef::Var(_) => false,
        })
    }
}

/// Replace bound type variables inside `ty`.
fn substitute(ty: &TypeRef, bindings: &Bindings) -> TypeRef {
    match ty {
        TypeRef::Var(var) => bindings.get(var).cloned().unwrap_or_else(|| ty.clone()),
        TypeRef::Applied { base, args } => TypeRef::Applied {
            base: base.clone(),
            args: args.iter().map(|arg| substitute(arg, bindings)).collect(),
        },
        TypeRef::Named(_) => ty.clone(),
    }
}
