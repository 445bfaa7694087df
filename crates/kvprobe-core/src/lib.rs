//! # kvprobe core
//!
//! Core types shared by every kvprobe crate: the engine capability contract,
//! the error taxonomy used to classify engine responses, and a reference
//! in-memory engine the harness validates itself against.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod error;
pub mod memory;

pub use engine::{Engine, EngineConfig, EngineOpener};
pub use error::{classify_message, Error, ErrorKind, Result};
pub use memory::{MemoryEngine, MemoryOpener};
