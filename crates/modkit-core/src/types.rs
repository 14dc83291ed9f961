//! Declared-type metadata.
//!
//! Mods never expose runtime values of the artifact types they transform
//! until a transformation is requested, so capability matching works on
//! declarations instead: each mod class declares its type parameters, its
//! superclass and the contracts it implements, with whatever concrete or
//! variable type arguments it binds them to.

use std::borrow::Cow;
use std::fmt;

/// Stable textual identity of a declared type.
///
/// Mod classes and built-in contracts use dotted names (`"pkg.Replacer"`);
/// artifact and context types are usually named from their Rust type via
/// [`TypeName::of`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(Cow<'static, str>);

impl TypeName {
    /// Create a type name from any string.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Create a type name from a static string without allocating.
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Name a Rust type.
    #[must_use]
    pub fn of<T: ?Sized>() -> Self {
        Self::from_static(std::any::type_name::<T>())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TypeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for TypeName {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

/// A use of a type inside a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A concrete, non-parameterized type.
    Named(TypeName),
    /// A type parameter of the enclosing declaration.
    Var(String),
    /// A parameterized type with its arguments.
    Applied {
        /// The raw (generic) type.
        base: TypeName,
        /// Type arguments, aligned with the base's parameter list.
        args: Vec<TypeRef>,
    },
}

impl TypeRef {
    /// Reference a concrete type by name.
    #[must_use]
    pub fn named(name: impl Into<TypeName>) -> Self {
        Self::Named(name.into())
    }

    /// Reference a Rust type.
    #[must_use]
    pub fn of<T: ?Sized>() -> Self {
        Self::Named(TypeName::of::<T>())
    }

    /// Reference a type parameter.
    #[must_use]
    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }

    /// Reference a parameterized type.
    #[must_use]
    pub fn applied(base: impl Into<TypeName>, args: impl IntoIterator<Item = TypeRef>) -> Self {
        Self::Applied {
            base: base.into(),
            args: args.into_iter().collect(),
        }
    }

    /// The raw type this reference points at, if it is not a bare variable.
    #[must_use]
    pub fn raw(&self) -> Option<&TypeName> {
        match self {
            Self::Named(name) | Self::Applied { base: name, .. } => Some(name),
            Self::Var(_) => None,
        }
    }

    /// Whether this reference is exactly the concrete type `name`.
    #[must_use]
    pub fn is_named(&self, name: &TypeName) -> bool {
        matches!(self, Self::Named(n) if n == name)
    }
}

impl From<TypeName> for TypeRef {
    fn from(name: TypeName) -> Self {
        Self::Named(name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::Var(var) => f.write_str(var),
            Self::Applied { base, args } => {
                write!(f, "{base}<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            },
        }
    }
}

/// Declaration of a type: its parameters and direct supertypes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    /// The declared type.
    pub name: TypeName,
    /// Type parameter names, in declaration order.
    pub params: Vec<String>,
    /// Direct superclass, if any.
    pub superclass: Option<TypeRef>,
    /// Directly implemented contracts, in declaration order.
    pub interfaces: Vec<TypeRef>,
    /// Types declared inside this one (candidate adapters).
    pub nested: Vec<TypeName>,
}

impl TypeDecl {
    /// Start a declaration with no parameters and no supertypes.
    #[must_use]
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            nested: Vec::new(),
        }
    }

    /// Add a type parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(name.into());
        self
    }

    /// Set the superclass.
    #[must_use]
    pub fn extends(mut self, superclass: TypeRef) -> Self {
        self.superclass = Some(superclass);
        self
    }

    /// Add an implemented contract.
    #[must_use]
    pub fn implements(mut self, contract: TypeRef) -> Self {
        self.interfaces.push(contract);
        self
    }

    /// Add a nested type.
    #[must_use]
    pub fn nest(mut self, nested: impl Into<TypeName>) -> Self {
        self.nested.push(nested.into());
        self
    }

    /// Superclass followed by interfaces.
    pub fn supertypes(&self) -> impl Iterator<Item = &TypeRef> {
        self.superclass.iter().chain(self.interfaces.iter())
    }
}
