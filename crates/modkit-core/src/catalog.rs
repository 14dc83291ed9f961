//! Queryable graph of type declarations.

use std::collections::{HashMap, HashSet};

use crate::error::{ModError, ModResult};
use crate::types::{TypeDecl, TypeName, TypeRef};

/// The base contract every mod implements.
pub const MOD_CONTRACT: TypeName = TypeName::from_static("modkit.Mod");

/// The generic transformer contract `ClassMod<T, C>`.
pub const CLASS_MOD_CONTRACT: TypeName = TypeName::from_static("modkit.ClassMod");

/// The adapter contract `ClassMod.And<U, D>`, itself a `ClassMod<U, D>`.
pub const ADAPTER_CONTRACT: TypeName = TypeName::from_static("modkit.ClassMod.And");

/// The resource transformer contract.
pub const RESOURCE_MOD_CONTRACT: TypeName = TypeName::from_static("modkit.ResourceMod");

/// Declared-type metadata for every mod class and contract the host knows.
///
/// Supertypes that are referenced but never declared are treated as leaves.
/// Declarations that would close an inheritance cycle are rejected, so every
/// walk over the graph terminates.
#[derive(Debug, Clone)]
pub struct TypeCatalog {
    decls: HashMap<TypeName, TypeDecl>,
}

impl TypeCatalog {
    /// Create a catalog seeded with the built-in contracts.
    #[must_use]
    pub fn new() -> Self {
        let mut decls = HashMap::new();
        for decl in builtin_contracts() {
            decls.insert(decl.name.clone(), decl);
        }
        Self { decls }
    }

    /// Add or replace a declaration.
    ///
    /// # Errors
    ///
    /// Returns [`ModError::InvalidDeclaration`] if a supertype argument list
    /// does not fit the supertype's declared parameters, or if the
    /// declaration would make the type its own ancestor.
    pub fn declare(&mut self, decl: TypeDecl) -> ModResult<()> {
        for supertype in decl.supertypes() {
            if let TypeRef::Applied { base, args } = supertype
                && let Some(base_decl) = self.decls.get(base)
                && base_decl.params.len() != args.len()
            {
                return Err(ModError::InvalidDeclaration {
                    name: decl.name.clone(),
                    message: format!(
                        "{base} takes {} type argument(s), got {}",
                        base_decl.params.len(),
                        args.len()
                    ),
                });
            }
            if let Some(raw) = supertype.raw()
                && (raw == &decl.name || self.is_assignable(raw, &decl.name))
            {
                return Err(ModError::InvalidDeclaration {
                    name: decl.name.clone(),
                    message: format!("inheriting from {raw} creates a cycle"),
                });
            }
        }
        self.decls.insert(decl.name.clone(), decl);
        Ok(())
    }

    /// Look up a declaration.
    #[must_use]
    pub fn get(&self, name: &TypeName) -> Option<&TypeDecl> {
        self.decls.get(name)
    }

    /// Whether `name` has been declared.
    #[must_use]
    pub fn contains(&self, name: &TypeName) -> bool {
        self.decls.contains_key(name)
    }

    /// Number of declarations, built-in contracts included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Whether the catalog holds no declarations at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Whether `from` is `to` or has `to` among its (raw) ancestors.
    ///
    /// Type arguments are ignored; this answers "does this class implement
    /// the contract at all", not "for which arguments".
    #[must_use]
    pub fn is_assignable(&self, from: &TypeName, to: &TypeName) -> bool {
        let mut seen = HashSet::new();
        self.is_assignable_inner(from, to, &mut seen)
    }

    fn is_assignable_inner<'a>(
        &'a self,
        from: &'a TypeName,
        to: &TypeName,
        seen: &mut HashSet<&'a TypeName>,
    ) -> bool {
        if from == to {
            return true;
        }
        if !seen.insert(from) {
            return false;
        }
        let Some(decl) = self.decls.get(from) else {
            return false;
        };
        decl.supertypes()
            .filter_map(TypeRef::raw)
            .any(|raw| self.is_assignable_inner(raw, to, seen))
    }
}

impl Default for TypeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_contracts() -> [TypeDecl; 4] {
    [
        TypeDecl::new(MOD_CONTRACT),
        TypeDecl::new(CLASS_MOD_CONTRACT)
            .param("T")
            .param("C")
            .implements(TypeRef::Named(MOD_CONTRACT)),
        TypeDecl::new(ADAPTER_CONTRACT)
            .param("U")
            .param("D")
            .implements(TypeRef::applied(
                CLASS_MOD_CONTRACT,
                [TypeRef::var("U"), TypeRef::var("D")],
            )),
        TypeDecl::new(RESOURCE_MOD_CONTRACT).implements(TypeRef::Named(MOD_CONTRACT)),
    ]
}
