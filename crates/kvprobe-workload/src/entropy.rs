//! Randomness sources.
//!
//! The secure generator is process-wide state, so it sits behind
//! [`EntropySource`] and tests can swap in a seeded or failing source.

use std::sync::Mutex;

use kvprobe_core::{Error, Result};
use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};

/// A source of random bytes.
pub trait EntropySource: Send + Sync {
    /// Fill `buf` entirely with random bytes, or report why that was impossible.
    fn fill(&self, buf: &mut [u8]) -> Result<()>;
}

/// Cryptographically secure randomness from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| Error::Entropy(e.to_string()))
    }
}

/// Deterministic pseudo-random bytes from a fixed seed.
///
/// Not suitable for anything security related.
#[derive(Debug)]
pub struct SeededEntropy {
    rng: Mutex<StdRng>,
}

impl SeededEntropy {
    /// Create a source that always yields the same stream for `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl EntropySource for SeededEntropy {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        let mut rng = self.rng.lock().map_err(|_| Error::LockPoisoned)?;
        rng.fill_bytes(buf);
        Ok(())
    }
}

/// A source that always fails, used to force the fallback path.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableEntropy;

impl EntropySource for UnavailableEntropy {
    fn fill(&self, _buf: &mut [u8]) -> Result<()> {
        Err(Error::Entropy("entropy source unavailable".to_string()))
    }
}
