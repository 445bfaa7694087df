//! Engine capability contract.
//!
//! The harness never depends on a concrete storage engine. Anything that can
//! put, get, delete, test existence and close can be driven by kvprobe.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::Result;

/// Capability surface of an open storage engine.
///
/// One handle may be shared by several worker threads, so implementations
/// must be safe for concurrent use; the harness adds no external locking.
pub trait Engine: Send + Sync {
    /// Insert or update a key-value pair
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Retrieve a value by key.
    ///
    /// An absent key must produce an error that classifies as
    /// [`ErrorKind::NotFound`](crate::ErrorKind::NotFound).
    fn get(&self, key: &[u8]) -> Result<Vec<u8>>;

    /// Delete a key
    fn delete(&self, key: &[u8]) -> Result<()>;

    /// Check whether a key is present
    fn exists(&self, key: &[u8]) -> Result<bool>;

    /// Close the handle.
    ///
    /// Closing twice may return an error that classifies as
    /// [`ErrorKind::Closed`](crate::ErrorKind::Closed); callers treat that as
    /// the expected terminal state.
    fn close(&self) -> Result<()>;
}

impl<E: Engine + ?Sized> Engine for Arc<E> {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        (**self).put(key, value)
    }

    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        (**self).get(key)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        (**self).delete(key)
    }

    fn exists(&self, key: &[u8]) -> Result<bool> {
        (**self).exists(key)
    }

    fn close(&self) -> Result<()> {
        (**self).close()
    }
}

/// Options handed to an engine when it is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Storage location; mirrors the location passed to [`EngineOpener::open`]
    pub path: PathBuf,
    /// Persist after every mutation instead of only on close
    pub sync_writes: bool,
    /// Create the storage location if it does not exist
    pub create_if_missing: bool,
}

impl EngineConfig {
    /// Create a config for the given location with default options
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sync_writes: false,
            create_if_missing: true,
        }
    }

    /// Set whether every mutation is persisted immediately
    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    /// Set whether the storage location is created on open
    pub fn with_create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }
}

/// Lifecycle entry point of an engine implementation.
pub trait EngineOpener: Send + Sync {
    /// Handle type produced by [`open`](Self::open)
    type Engine: Engine;

    /// Open (or create) an engine at `location`, configured by `config`.
    fn open(&self, location: &Path, config: &EngineConfig) -> Result<Self::Engine>;
}
