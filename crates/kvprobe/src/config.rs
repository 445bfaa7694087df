//! Harness configuration.

use std::path::PathBuf;
use std::str::FromStr;

use kvprobe_core::{Error, Result};
use kvprobe_workload::DEFAULT_SEED;

/// Environment variable overriding [`HarnessConfig::temp_root`]
pub const ENV_TMPDIR: &str = "KVPROBE_TMPDIR";
/// Environment variable overriding [`HarnessConfig::prefix`]
pub const ENV_PREFIX: &str = "KVPROBE_PREFIX";
/// Environment variable overriding [`HarnessConfig::seed`]
pub const ENV_SEED: &str = "KVPROBE_SEED";
/// Environment variable overriding [`HarnessConfig::workers`]
pub const ENV_WORKERS: &str = "KVPROBE_WORKERS";
/// Environment variable overriding [`HarnessConfig::sync_writes`]
pub const ENV_SYNC_WRITES: &str = "KVPROBE_SYNC_WRITES";
/// Environment variable overriding [`HarnessConfig::log_level`]
pub const ENV_LOG: &str = "KVPROBE_LOG";

/// Configuration shared by the provisioner and the benchmark driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Directory hosting per-instance storage locations
    pub temp_root: PathBuf,
    /// Name prefix of every storage location
    pub prefix: String,
    /// Seed for deterministic payload fallback
    pub seed: u64,
    /// Worker threads used by parallel benchmark cases
    pub workers: usize,
    /// Ask engines to persist every mutation
    pub sync_writes: bool,
    /// Log filter directive
    pub log_level: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            temp_root: std::env::temp_dir(),
            prefix: "kvprobe".to_string(),
            seed: DEFAULT_SEED,
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            sync_writes: false,
            log_level: "info".to_string(),
        }
    }
}

impl HarnessConfig {
    /// Defaults overridden by any `KVPROBE_*` variables that are set
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_TMPDIR) {
            config.temp_root = PathBuf::from(dir);
        }
        if let Some(prefix) = lookup(ENV_PREFIX) {
            config.prefix = prefix;
        }
        if let Some(seed) = lookup(ENV_SEED) {
            config.seed = parse(ENV_SEED, &seed)?;
        }
        if let Some(workers) = lookup(ENV_WORKERS) {
            config = config.with_workers(parse(ENV_WORKERS, &workers)?);
        }
        if let Some(sync) = lookup(ENV_SYNC_WRITES) {
            config.sync_writes = parse_bool(ENV_SYNC_WRITES, &sync)?;
        }
        if let Some(level) = lookup(ENV_LOG) {
            config.log_level = level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the directory hosting storage locations
    pub fn with_temp_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.temp_root = root.into();
        self
    }

    /// Set the storage location prefix
    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the fallback seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of parallel workers (at least one)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set whether engines persist every mutation
    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    /// Set the log filter directive
    pub fn with_log_level<S: Into<String>>(mut self, level: S) -> Self {
        self.log_level = level.into();
        self
    }

    /// Reject configurations that cannot produce valid storage locations
    pub fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() {
            return Err(Error::InvalidOperation("prefix must not be empty".to_string()));
        }
        if self.prefix.contains(std::path::is_separator) {
            return Err(Error::InvalidOperation(format!(
                "prefix must not contain a path separator: {:?}",
                self.prefix
            )));
        }
        Ok(())
    }
}

fn parse<T: FromStr>(name: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::InvalidOperation(format!("{}={:?}: {}", name, raw, e)))
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::InvalidOperation(format!(
            "{}={:?}: expected a boolean",
            name, raw
        ))),
    }
}
