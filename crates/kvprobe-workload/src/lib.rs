//! # kvprobe workload
//!
//! Reproducible-yet-realistic key/value payloads and the workload plans the
//! benchmark driver executes.
//!
//! ```rust
//! use kvprobe_workload::Generator;
//!
//! let gen = Generator::secure();
//! let key = gen.generate_key(16);
//! assert_eq!(key.len(), 16);
//!
//! let keys = gen.generate_sequential_keys(3, "user:");
//! assert_eq!(keys, vec!["user:000000", "user:000001", "user:000002"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entropy;
pub mod generator;
pub mod plan;

pub use entropy::{EntropySource, OsEntropy, SeededEntropy, UnavailableEntropy};
pub use generator::{
    fallback_key, fallback_value, sequential_key, sequential_keys, Generator, DEFAULT_KEY_LEN,
    DEFAULT_SEED, DEFAULT_VALUE_LEN, KEY_ALPHABET, VALUE_ALPHABET,
};
pub use plan::{Operation, OperationMix, WorkloadPlan};
