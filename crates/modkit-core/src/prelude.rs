//! Prelude module - commonly used types for convenient import.
//!
//! Use `use modkit_core::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust
//! use modkit_core::prelude::*;
//!
//! // Now you have access to:
//! // - ModError, ModResult, NotFoundKind
//! // - Mod, ClassMod, ClassHook, ClassAdapter, ResourceMod, ErasedView
//! // - TypeCatalog, TypeDecl, TypeName, TypeRef and the built-in contracts
//! // - ModRegistry, FrozenRegistry, RegisteredMod
//! ```

// Errors
pub use crate::{ModError, ModResult, NotFoundKind};

// Mod contracts
pub use crate::{ClassAdapter, ClassHook, ClassMod, ErasedView, Mod, ResourceMod};

// Declared types
pub use crate::{
    ADAPTER_CONTRACT, CLASS_MOD_CONTRACT, MOD_CONTRACT, RESOURCE_MOD_CONTRACT, TypeCatalog,
    TypeDecl, TypeName, TypeRef,
};

// Artifacts
pub use crate::{ArtifactSource, BytecodeBackend, ClassBytes, ClassContext, ResourceStream};

// Registry
pub use crate::{FrozenRegistry, ModRegistry, RegisteredMod};
