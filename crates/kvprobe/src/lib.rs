//! # kvprobe
//!
//! Correctness and performance verification harness for pluggable key-value
//! engines.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kvprobe::{assertions, Engine, HarnessConfig, MemoryOpener, Provisioner, TestContext};
//!
//! let t = TestContext::new("roundtrip");
//! let provisioner = Provisioner::new(MemoryOpener, HarnessConfig::from_env()?);
//!
//! // Fresh, isolated engine; closed and removed when `db` goes out of scope
//! let db = provisioner.provision_for_test(&t);
//!
//! db.put(b"k1", b"v1")?;
//! assertions::assert_key_exists(&t, db.engine(), b"k1");
//! assertions::assert_key_value(&t, db.engine(), b"k1", b"v1");
//! # Ok::<(), kvprobe::Error>(())
//! ```
//!
//! ## Components
//!
//! - [`Generator`]: secure random keys and values with a deterministic fallback
//! - [`Provisioner`]: isolated engine instances with guaranteed teardown
//! - [`assertions`]: typed checks reporting through a [`Reporter`]
//! - [`run_concurrent`] and [`concurrently!`]: fire-and-join helpers
//! - [`Driver`]: benchmark workloads with setup excluded from the timing

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assertions;
pub mod concurrent;
pub mod config;
pub mod driver;
pub mod instance;
pub mod logging;
pub mod report;

// Engine contract and reference engine
pub use kvprobe_core::{
    classify_message, Engine, EngineConfig, EngineOpener, Error, ErrorKind, MemoryEngine,
    MemoryOpener, Result,
};

// Payloads and plans
pub use kvprobe_workload::{
    sequential_key, sequential_keys, EntropySource, Generator, Operation, OperationMix,
    OsEntropy, SeededEntropy, UnavailableEntropy, WorkloadPlan, DEFAULT_KEY_LEN, DEFAULT_SEED,
    DEFAULT_VALUE_LEN,
};

pub use concurrent::{run_concurrent, Task};
pub use config::HarnessConfig;
pub use driver::{
    run_measured, Batch, ConcurrentPutGet, Driver, Measurement, Mixed, PutOnly, RandomGet,
    SingleOp, Workload,
};
pub use instance::{Instance, Provisioner};
pub use logging::{init_test_logging, LogConfig, LogFormat, LogOutput};
pub use report::{BenchContext, Reporter, TestContext};

/// Version of the harness
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
