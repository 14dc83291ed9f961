//! modkit Core - capability matching and mod dispatch.
//!
//! This crate provides:
//! - Declared-type metadata and the [`TypeCatalog`] it lives in
//! - The [`CapabilityMatcher`] deciding which (artifact, context) pairs a
//!   mod class can process
//! - The [`CapabilityAdapter`] serving other pairs through nested adapters
//! - Mod contracts ([`Mod`], [`ClassMod`], [`ResourceMod`])
//! - The [`ModRegistry`] and its frozen, shareable form
//! - The transformation pipeline

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod adapter;
pub mod artifact;
pub mod catalog;
pub mod contract;
pub mod error;
pub mod matcher;
pub mod pipeline;
pub mod registry;
pub mod types;

pub use adapter::{AdapterAssociations, AdapterId, CapabilityAdapter};
pub use artifact::{ArtifactSource, BytecodeBackend, ClassBytes, ClassContext, ResourceStream};
pub use catalog::{
    ADAPTER_CONTRACT, CLASS_MOD_CONTRACT, MOD_CONTRACT, RESOURCE_MOD_CONTRACT, TypeCatalog,
};
pub use contract::{ClassAdapter, ClassHook, ClassMod, ErasedView, Mod, ResourceMod};
pub use error::{ModError, ModResult, NotFoundKind};
pub use matcher::CapabilityMatcher;
pub use pipeline::{apply_class_mods, apply_resource_mods};
pub use registry::{FrozenRegistry, HostClassMod, ModRegistry, RegisteredMod};
pub use types::{TypeDecl, TypeName, TypeRef};
