//! Isolated engine instances.
//!
//! Every test or benchmark run gets its own storage location under the
//! configured temp root, named
//! `{prefix}-{unix_nanos}-{hex(8 random bytes)}`. The timestamp plus a secure
//! random suffix keeps concurrently provisioned locations apart without any
//! coordination.
//!
//! An [`Instance`] is a guard: dropping it closes the handle and removes the
//! location, on normal return and while unwinding from a fatal failure.

use std::fmt::Write as _;
use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use kvprobe_core::{Engine, EngineConfig, EngineOpener, Error, Result};
use kvprobe_workload::{EntropySource, OsEntropy};
use tracing::debug;

use crate::config::HarnessConfig;
use crate::report::{BenchContext, Reporter, TestContext};

/// Random bytes in the location suffix
const SUFFIX_BYTES: usize = 8;

/// Creates isolated engine instances.
pub struct Provisioner<O: EngineOpener> {
    opener: O,
    config: HarnessConfig,
    entropy: Arc<dyn EntropySource>,
}

impl<O: EngineOpener> Provisioner<O> {
    /// Create a provisioner using the operating system's secure entropy
    pub fn new(opener: O, config: HarnessConfig) -> Self {
        Self {
            opener,
            config,
            entropy: Arc::new(OsEntropy),
        }
    }

    /// Replace the entropy source used for location suffixes
    pub fn with_entropy(mut self, entropy: Arc<dyn EntropySource>) -> Self {
        self.entropy = entropy;
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Build a fresh, unique storage location path.
    ///
    /// Fails if the entropy source cannot produce the suffix; there is no
    /// fallback here because a predictable suffix could collide.
    pub fn unique_location(&self) -> Result<PathBuf> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| Error::InvalidOperation(format!("system clock before epoch: {}", e)))?
            .as_nanos();

        let mut suffix = [0u8; SUFFIX_BYTES];
        self.entropy.fill(&mut suffix)?;

        let name = format!("{}-{}-{}", self.config.prefix, nanos, to_hex(&suffix));
        Ok(self.config.temp_root.join(name))
    }

    /// Open an engine at a fresh location, reporting errors to the caller.
    pub fn try_provision(&self) -> Result<(PathBuf, O::Engine)> {
        self.config.validate()?;
        let location = self.unique_location()?;
        let config = EngineConfig::new(&location).with_sync_writes(self.config.sync_writes);

        let engine = self.opener.open(&location, &config)?;
        debug!(location = %location.display(), "instance provisioned");
        Ok((location, engine))
    }

    /// Provision an instance owned by `owner`; any failure is fatal.
    pub fn provision<'a>(&self, owner: &'a dyn Reporter) -> Instance<'a, O::Engine> {
        match self.try_provision() {
            Ok((location, engine)) => Instance {
                location,
                handle: Arc::new(engine),
                owner,
                released: false,
            },
            Err(e) => owner.fatal(&format!("failed to provision engine instance: {}", e)),
        }
    }

    /// Provision an instance for a correctness test
    pub fn provision_for_test<'a>(&self, t: &'a TestContext) -> Instance<'a, O::Engine> {
        self.provision(t)
    }

    /// Provision an instance for a benchmark case
    pub fn provision_for_bench<'a>(&self, b: &'a BenchContext) -> Instance<'a, O::Engine> {
        self.provision(b)
    }
}

/// A provisioned engine and its storage location.
///
/// Dereferences to the engine. The handle is shared through an [`Arc`] so
/// parallel workers can use it; teardown closes it for every holder.
pub struct Instance<'a, E: Engine> {
    location: PathBuf,
    handle: Arc<E>,
    owner: &'a dyn Reporter,
    released: bool,
}

impl<'a, E: Engine> Instance<'a, E> {
    /// Storage location of this instance
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// The engine handle
    pub fn engine(&self) -> &E {
        &self.handle
    }

    /// A shared reference to the engine handle
    pub fn handle(&self) -> Arc<E> {
        Arc::clone(&self.handle)
    }

    /// Context failures are reported to
    pub fn owner(&self) -> &'a dyn Reporter {
        self.owner
    }

    /// Close the handle and remove the storage location now.
    pub fn teardown(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match self.handle.close() {
            Ok(()) => {}
            Err(e) if e.is_closed() => {
                debug!(location = %self.location.display(), "handle already closed");
            }
            Err(e) => self.owner.error(&format!(
                "failed to close engine at {}: {}",
                self.location.display(),
                e
            )),
        }

        if let Err(e) = fs::remove_dir_all(&self.location) {
            debug!(location = %self.location.display(), error = %e, "cleanup skipped");
        } else {
            debug!(location = %self.location.display(), "instance removed");
        }
    }
}

impl<E: Engine> Deref for Instance<'_, E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.handle
    }
}

impl<E: Engine> Drop for Instance<'_, E> {
    fn drop(&mut self) {
        self.release();
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{:02x}", b);
        s
    })
}
