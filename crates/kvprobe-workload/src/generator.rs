//! Key/value payload generation.
//!
//! Payloads are drawn from a secure entropy source and mapped into a fixed
//! alphabet. When the source fails, [`Generator::generate_key`] and
//! [`Generator::generate_value`] degrade to a deterministic, seed-based
//! sequence so reproducibility-sensitive tests never flake. Callers that must
//! not degrade use the `try_` variants.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use kvprobe_core::Result;
use tracing::{debug, warn};

use crate::entropy::{EntropySource, OsEntropy};

/// Alphabet for generated keys (62 characters)
pub const KEY_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Alphabet for generated values (76 characters)
pub const VALUE_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()-_=+";

/// Offset applied to the fallback index for values, so a key and a value
/// generated from the same seed do not share a prefix.
const VALUE_FALLBACK_OFFSET: u64 = 100;

/// Key length used by [`Generator::generate_key_value_pairs`]
pub const DEFAULT_KEY_LEN: usize = 16;

/// Value length used by [`Generator::generate_key_value_pairs`]
pub const DEFAULT_VALUE_LEN: usize = 64;

/// Width of the zero-padded counter in sequential keys.
///
/// Lexicographic order equals numeric order up to 999,999 keys.
pub const SEQUENTIAL_WIDTH: usize = 6;

/// Seed used when none is configured
pub const DEFAULT_SEED: u64 = 42;

/// Payload generator.
pub struct Generator {
    source: Arc<dyn EntropySource>,
    seed: u64,
    fallback_reported: AtomicBool,
}

impl Generator {
    /// Create a generator over `source` with [`DEFAULT_SEED`]
    pub fn new(source: Arc<dyn EntropySource>) -> Self {
        Self {
            source,
            seed: DEFAULT_SEED,
            fallback_reported: AtomicBool::new(false),
        }
    }

    /// Create a generator backed by the operating system's secure source
    pub fn secure() -> Self {
        Self::new(Arc::new(OsEntropy))
    }

    /// Set the seed used by the fallback path
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Seed used by the fallback path
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate a key of exactly `len` characters from [`KEY_ALPHABET`].
    ///
    /// Fails if the entropy source is unavailable.
    pub fn try_generate_key(&self, len: usize) -> Result<Vec<u8>> {
        self.draw(KEY_ALPHABET, len)
    }

    /// Generate a value of exactly `len` characters from [`VALUE_ALPHABET`].
    ///
    /// Fails if the entropy source is unavailable.
    pub fn try_generate_value(&self, len: usize) -> Result<Vec<u8>> {
        self.draw(VALUE_ALPHABET, len)
    }

    /// Generate a key, falling back to [`fallback_key`] on entropy failure.
    pub fn generate_key(&self, len: usize) -> Vec<u8> {
        match self.try_generate_key(len) {
            Ok(key) => key,
            Err(e) => {
                self.report_fallback(&e);
                fallback_key(self.seed, len)
            }
        }
    }

    /// Generate a value, falling back to [`fallback_value`] on entropy failure.
    pub fn generate_value(&self, len: usize) -> Vec<u8> {
        match self.try_generate_value(len) {
            Ok(value) => value,
            Err(e) => {
                self.report_fallback(&e);
                fallback_value(self.seed, len)
            }
        }
    }

    /// Generate `count` unique keys of [`DEFAULT_KEY_LEN`] mapped to values of
    /// [`DEFAULT_VALUE_LEN`].
    pub fn generate_key_value_pairs(&self, count: usize) -> HashMap<String, String> {
        let mut pairs = HashMap::with_capacity(count);

        for index in 0..count {
            let key = self.distinct_key(DEFAULT_KEY_LEN, index, |k| pairs.contains_key(k));
            let value = into_string(self.generate_value(DEFAULT_VALUE_LEN));
            pairs.insert(key, value);
        }

        pairs
    }

    /// Generate `count` distinct keys of length `len`.
    ///
    /// Distinct on the fallback path too, as long as `len` leaves room for
    /// the zero-padded disambiguator.
    pub fn generate_unique_keys(&self, count: usize, len: usize) -> Vec<Vec<u8>> {
        let mut seen: HashSet<String> = HashSet::with_capacity(count);
        let mut keys = Vec::with_capacity(count);

        for index in 0..count {
            let key = self.distinct_key(len, index, |k| seen.contains(k));
            seen.insert(key.clone());
            keys.push(key.into_bytes());
        }

        keys
    }

    fn distinct_key<F>(&self, len: usize, index: usize, taken: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        let mut key = into_string(self.generate_key(len));
        let mut salt = index;
        while taken(&key) {
            key = disambiguate(&key, salt);
            salt += 1;
        }
        key
    }

    /// Generate `count` keys of the form `{prefix}{counter:06}`.
    pub fn generate_sequential_keys(&self, count: usize, prefix: &str) -> Vec<String> {
        sequential_keys(count, prefix)
    }

    fn draw(&self, alphabet: &[u8], len: usize) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; len];
        if len == 0 {
            return Ok(bytes);
        }

        self.source.fill(&mut bytes)?;
        for b in bytes.iter_mut() {
            *b = alphabet[*b as usize % alphabet.len()];
        }
        Ok(bytes)
    }

    fn report_fallback(&self, err: &kvprobe_core::Error) {
        if !self.fallback_reported.swap(true, Ordering::Relaxed) {
            warn!(seed = self.seed, error = %err, "entropy unavailable, using deterministic payloads");
        } else {
            debug!(seed = self.seed, "deterministic payload fallback");
        }
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::secure()
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator").field("seed", &self.seed).finish()
    }
}

/// Deterministic key: position `i` maps to `KEY_ALPHABET[(seed + i) % 62]`.
pub fn fallback_key(seed: u64, len: usize) -> Vec<u8> {
    fallback(KEY_ALPHABET, seed, 0, len)
}

/// Deterministic value: position `i` maps to `VALUE_ALPHABET[(seed + i + 100) % 76]`.
pub fn fallback_value(seed: u64, len: usize) -> Vec<u8> {
    fallback(VALUE_ALPHABET, seed, VALUE_FALLBACK_OFFSET, len)
}

fn fallback(alphabet: &[u8], seed: u64, offset: u64, len: usize) -> Vec<u8> {
    let size = alphabet.len() as u64;
    (0..len as u64)
        .map(|i| alphabet[(seed.wrapping_add(i).wrapping_add(offset) % size) as usize])
        .collect()
}

/// Sequential key `{prefix}{index:06}`
pub fn sequential_key(prefix: &str, index: usize) -> String {
    format!("{}{:0width$}", prefix, index, width = SEQUENTIAL_WIDTH)
}

/// `count` sequential keys in ascending order
pub fn sequential_keys(count: usize, prefix: &str) -> Vec<String> {
    (0..count).map(|i| sequential_key(prefix, i)).collect()
}

// Generated payloads only contain ASCII alphabet characters.
fn into_string(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_default()
}

/// Rewrite the tail of `key` with a zero-padded `salt`, keeping its length.
fn disambiguate(key: &str, salt: usize) -> String {
    let suffix = format!("{:0width$}", salt, width = SEQUENTIAL_WIDTH);
    let keep = key.len().saturating_sub(suffix.len());
    format!("{}{}", &key[..keep], suffix)
}
