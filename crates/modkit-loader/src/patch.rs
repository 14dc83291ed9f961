//! Patching passes run by [`ModLoader::start`](crate::ModLoader::start).
//!
//! Artifacts are frozen by their consumer on first load, so every pass runs
//! before the entry point sees anything.

use std::io::Read;

use modkit_core::ModResult;
use tracing::debug;

use crate::runtime::ModRuntime;

/// An external class and resource patching pass.
pub trait PatchPass: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Patch class definitions. Runs for every pass before any
    /// [`patch_resources`](Self::patch_resources).
    ///
    /// # Errors
    ///
    /// Any error aborts `start`.
    fn patch_classes(&self, runtime: &ModRuntime) -> ModResult<()>;

    /// Patch resources.
    ///
    /// # Errors
    ///
    /// Any error aborts `start`.
    fn patch_resources(&self, _runtime: &ModRuntime) -> ModResult<()> {
        Ok(())
    }
}

/// Eagerly redefines a fixed set of classes and resources, so that hook
/// failures surface at startup instead of on first use.
#[derive(Debug, Clone, Default)]
pub struct PreloadPass {
    classes: Vec<String>,
    resources: Vec<String>,
}

impl PreloadPass {
    /// Create an empty pass.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also preload `class_name`.
    #[must_use]
    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.classes.push(class_name.into());
        self
    }

    /// Also preload `resource_name`.
    #[must_use]
    pub fn with_resource(mut self, resource_name: impl Into<String>) -> Self {
        self.resources.push(resource_name.into());
        self
    }
}

impl PatchPass for PreloadPass {
    fn name(&self) -> &str {
        "preload"
    }

    fn patch_classes(&self, runtime: &ModRuntime) -> ModResult<()> {
        for class_name in &self.classes {
            let definition = runtime.redefine_class(class_name)?;
            debug!(class = %class_name, bytes = definition.len(), "Preloaded class");
        }
        Ok(())
    }

    fn patch_resources(&self, runtime: &ModRuntime) -> ModResult<()> {
        for resource_name in &self.resources {
            let mut buf = Vec::new();
            runtime.open_resource(resource_name)?.read_to_end(&mut buf)?;
            debug!(resource = %resource_name, bytes = buf.len(), "Preloaded resource");
        }
        Ok(())
    }
}
