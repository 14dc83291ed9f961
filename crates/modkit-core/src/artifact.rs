//! Artifacts and the collaborators that supply and rewrite them.

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use crate::error::{ModError, ModResult, NotFoundKind};

/// Raw bytes of a class definition.
pub type ClassBytes = Vec<u8>;

/// A readable resource stream.
pub type ResourceStream = Box<dyn Read + Send>;

/// Supplies original, unpatched artifacts before any mod sees them.
pub trait ArtifactSource: Send + Sync {
    /// Load the raw definition of a class (dotted name) or resource (slash path).
    ///
    /// # Errors
    ///
    /// Returns [`ModError::NotFound`] with [`NotFoundKind::Artifact`] if the
    /// name is unknown; other errors are propagated to the requester.
    fn load_raw_artifact(&self, name: &str) -> ModResult<Vec<u8>>;

    /// Like [`load_raw_artifact`](Self::load_raw_artifact), but maps
    /// "not found" to `None`.
    ///
    /// # Errors
    ///
    /// Propagates every error except "artifact not found".
    fn find_raw_artifact(&self, name: &str) -> ModResult<Option<Vec<u8>>> {
        match self.load_raw_artifact(name) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.is_not_found(NotFoundKind::Artifact) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Produces patched class definitions from existing ones.
///
/// The rewriting itself lives outside this crate; the built-in replacement
/// and augmentation mods only decide *what* to rewrite.
pub trait BytecodeBackend: Send + Sync {
    /// Rewrite `definition` (of class `from`) so that it defines class `to`.
    ///
    /// # Errors
    ///
    /// Returns [`ModError::Backend`] if the definition cannot be rewritten.
    fn retarget(&self, definition: &[u8], from: &str, to: &str) -> ModResult<ClassBytes>;

    /// Merge the members of `augmentation` (class `augmentation_name`) into
    /// `target` (class `target_name`).
    ///
    /// # Errors
    ///
    /// Returns [`ModError::Backend`] if the definitions cannot be merged.
    fn augment(
        &self,
        target: &[u8],
        target_name: &str,
        augmentation: &[u8],
        augmentation_name: &str,
    ) -> ModResult<ClassBytes>;
}

/// Context handed to class transformers alongside the definition.
#[derive(Clone)]
pub struct ClassContext {
    class_name: String,
    source: Arc<dyn ArtifactSource>,
    backend: Option<Arc<dyn BytecodeBackend>>,
}

impl ClassContext {
    /// Create a context for one class request.
    #[must_use]
    pub fn new(
        class_name: impl Into<String>,
        source: Arc<dyn ArtifactSource>,
        backend: Option<Arc<dyn BytecodeBackend>>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            source,
            backend,
        }
    }

    /// The class being defined.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Where original definitions come from.
    #[must_use]
    pub fn source(&self) -> &dyn ArtifactSource {
        self.source.as_ref()
    }

    /// The installed bytecode backend.
    ///
    /// # Errors
    ///
    /// Returns [`ModError::BackendUnavailable`] if none is installed.
    pub fn backend(&self) -> ModResult<&dyn BytecodeBackend> {
        self.backend
            .as_deref()
            .ok_or_else(|| ModError::BackendUnavailable {
                name: self.class_name.clone(),
            })
    }
}

impl fmt::Debug for ClassContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassContext")
            .field("class_name", &self.class_name)
            .field("has_backend", &self.backend.is_some())
            .finish_non_exhaustive()
    }
}
