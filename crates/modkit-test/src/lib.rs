//! modkit Test - shared test utilities.
//!
//! Test doubles for the collaborators a loader needs (artifact source,
//! bytecode backend, discovery) and scripted mods whose behavior is fixed
//! up front.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! modkit-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use modkit_test::{MemoryArtifactSource, ScriptedClassMod, test_loader};
//!
//! #[test]
//! fn replaces_foo() {
//!     let mut loader = test_loader(MemoryArtifactSource::new());
//!     let replacer = ScriptedClassMod::replacer("test.Replacer", "pkg.Foo", b"R1");
//!     modkit_test::register_class_mod(&mut loader, replacer);
//!     let runtime = loader.freeze();
//!     assert_eq!(runtime.redefine_class("pkg.Foo").unwrap(), b"R1");
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod harness;
pub mod mocks;
pub mod mods;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
pub use mods::*;
