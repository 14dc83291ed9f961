//! Mock collaborators.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use modkit_core::{
    ArtifactSource, BytecodeBackend, ClassBytes, ModError, ModResult, NotFoundKind,
};
use modkit_loader::{DiscoveryService, ModLocation};

/// In-memory artifact source.
///
/// Names without an entry are `NotFound`; names registered with
/// [`with_failure`](Self::with_failure) fail with an I/O error.
#[derive(Debug, Default)]
pub struct MemoryArtifactSource {
    artifacts: HashMap<String, Vec<u8>>,
    failures: HashMap<String, String>,
    loads: AtomicUsize,
}

impl MemoryArtifactSource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an artifact.
    #[must_use]
    pub fn with_artifact(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.artifacts.insert(name.into(), bytes.into());
        self
    }

    /// Make loading `name` fail with an I/O error.
    #[must_use]
    pub fn with_failure(mut self, name: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures.insert(name.into(), message.into());
        self
    }

    /// How many loads were attempted.
    #[must_use]
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ArtifactSource for MemoryArtifactSource {
    fn load_raw_artifact(&self, name: &str) -> ModResult<Vec<u8>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.failures.get(name) {
            return Err(ModError::Io(std::io::Error::other(message.clone())));
        }
        self.artifacts
            .get(name)
            .cloned()
            .ok_or_else(|| ModError::not_found(NotFoundKind::Artifact, name))
    }
}

/// Bytecode backend that records every call.
///
/// `retarget` returns the definition unchanged; `augment` appends the
/// augmentation bytes to the target.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<String>>,
}

impl RecordingBackend {
    /// Create a backend with no recorded calls.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls so far, as `retarget:from->to` or `augment:target+augmentation`.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl BytecodeBackend for RecordingBackend {
    fn retarget(&self, definition: &[u8], from: &str, to: &str) -> ModResult<ClassBytes> {
        self.record(format!("retarget:{from}->{to}"));
        Ok(definition.to_vec())
    }

    fn augment(
        &self,
        target: &[u8],
        target_name: &str,
        augmentation: &[u8],
        augmentation_name: &str,
    ) -> ModResult<ClassBytes> {
        self.record(format!("augment:{target_name}+{augmentation_name}"));
        Ok([target, augmentation].concat())
    }
}

/// Discovery that returns a fixed list.
#[derive(Debug, Clone, Default)]
pub struct FixedDiscovery {
    locations: Vec<ModLocation>,
}

impl FixedDiscovery {
    /// Return `locations` on every run.
    #[must_use]
    pub fn new(locations: Vec<ModLocation>) -> Self {
        Self { locations }
    }
}

impl DiscoveryService for FixedDiscovery {
    fn find_mod_artifacts(&self) -> Vec<ModLocation> {
        self.locations.clone()
    }
}
