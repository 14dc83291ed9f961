//! Mod orchestration error types.

use std::fmt;
use std::path::PathBuf;

use crate::types::TypeName;

/// What kind of thing a [`ModError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundKind {
    /// A mod class that is not on the class path.
    ModClass,
    /// A registered mod instance (e.g. a built-in the caller depends on).
    Mod,
    /// A class definition or resource.
    Artifact,
    /// A main entry point.
    EntryPoint,
}

impl fmt::Display for NotFoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ModClass => "mod class",
            Self::Mod => "mod",
            Self::Artifact => "artifact",
            Self::EntryPoint => "entry point",
        })
    }
}

/// Errors from mod orchestration.
#[derive(Debug, thiserror::Error)]
pub enum ModError {
    /// A requested mod class, mod, artifact, or entry point does not exist.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// What was being looked up.
        kind: NotFoundKind,
        /// The name that failed to resolve.
        name: String,
    },

    /// A mod cannot be viewed as a transformer for the requested pair.
    #[error("mod {mod_type} does not accept ({artifact}, {context})")]
    NoCapability {
        /// Declared type of the mod.
        mod_type: TypeName,
        /// Requested artifact type.
        artifact: TypeName,
        /// Requested context type.
        context: TypeName,
    },

    /// A transformer chain claimed a name but produced no artifact.
    #[error("{name} is hooked by {hooked_by} transformer(s) but no definition was produced")]
    UnsatisfiedHook {
        /// The artifact name that was requested.
        name: String,
        /// How many transformers declared that they hook this name.
        hooked_by: usize,
    },

    /// Every construction shape for a mod class failed.
    #[error("no valid constructor signatures for {class}: [{}]", .attempts.join("; "))]
    ConstructionFailure {
        /// The mod class being constructed.
        class: String,
        /// One diagnostic line per shape that existed and failed.
        attempts: Vec<String>,
    },

    /// A transformer needs an existing definition to work on.
    ///
    /// Tolerated by the pipeline while no definition exists yet; a later
    /// transformer may still supply one.
    #[error("no definition available for {name}")]
    DefinitionUnavailable {
        /// The artifact name.
        name: String,
    },

    /// A type declaration is malformed or closes an inheritance cycle.
    #[error("invalid declaration for {name}: {message}")]
    InvalidDeclaration {
        /// The declared type.
        name: TypeName,
        /// Why it was rejected.
        message: String,
    },

    /// A bytecode operation was requested but no backend is installed.
    #[error("no bytecode backend available to rewrite {name}")]
    BackendUnavailable {
        /// The class being rewritten.
        name: String,
    },

    /// The bytecode backend rejected a rewrite.
    #[error("bytecode backend failed for {name}: {message}")]
    Backend {
        /// The class being rewritten.
        name: String,
        /// Backend diagnostic.
        message: String,
    },

    /// A mod failed inside its own logic (construction, lifecycle hook, transform).
    #[error("mod {mod_name} failed: {message}")]
    Mod {
        /// The mod that failed.
        mod_name: String,
        /// Failure reason.
        message: String,
    },

    /// The main entry point returned an error.
    #[error("entry point {name} failed: {message}")]
    EntryPoint {
        /// The entry point name.
        name: String,
        /// Failure reason.
        message: String,
    },

    /// A mod bundle manifest could not be read or parsed.
    #[error("manifest error in {path}: {message}")]
    Manifest {
        /// Path to the manifest file.
        path: PathBuf,
        /// Read or parse error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ModError {
    /// Shorthand for a [`ModError::NotFound`].
    #[must_use]
    pub fn not_found(kind: NotFoundKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Shorthand for a [`ModError::Mod`] raised by mod code.
    #[must_use]
    pub fn in_mod(mod_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Mod {
            mod_name: mod_name.into(),
            message: message.into(),
        }
    }

    /// Whether this is a `NotFound` error of the given kind.
    #[must_use]
    pub fn is_not_found(&self, expected: NotFoundKind) -> bool {
        matches!(self, Self::NotFound { kind, .. } if *kind == expected)
    }
}

/// Result type for mod operations.
pub type ModResult<T> = Result<T, ModError>;
