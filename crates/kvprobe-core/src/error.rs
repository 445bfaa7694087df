//! Error types for kvprobe.

use std::fmt;

/// Renderings engines commonly use for a missing key, most specific first.
const NOT_FOUND_RENDERINGS: &[&str] = &["key not found", "not found", "no such key", "does not exist"];

/// Renderings engines commonly use for a handle that was already closed.
const CLOSED_RENDERINGS: &[&str] = &["engine is closed", "already closed", "closed"];

/// Closed-state phrases still recognised inside a wrapped message. A bare
/// "closed" only counts as the whole message.
const CLOSED_PHRASES: &[&str] = &["engine is closed", "already closed"];

/// The main error type for kvprobe operations.
#[derive(Debug)]
pub enum Error {
    /// A lock was poisoned (internal error)
    LockPoisoned,

    /// I/O error
    Io(std::io::Error),

    /// Serialization/deserialization error
    Serialization(String),

    /// The entropy source could not produce random bytes
    Entropy(String),

    /// The requested key is absent
    NotFound,

    /// The engine handle has been closed
    Closed,

    /// Opaque error reported by a black-box engine
    Engine(String),

    /// Invalid operation or configuration
    InvalidOperation(String),
}

/// Coarse classification of an [`Error`], independent of how it was rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The key does not exist
    NotFound,
    /// The handle is in its terminal closed state
    Closed,
    /// Anything else
    Other,
}

impl Error {
    /// Classifies this error.
    ///
    /// Structured variants map directly. [`Error::Engine`] carries only text,
    /// so its message is matched against known renderings: an exact match
    /// first, then case-insensitive substring containment so that wrapped
    /// messages ("get user:1: key not found") still classify.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound => ErrorKind::NotFound,
            Error::Closed => ErrorKind::Closed,
            Error::Engine(msg) => classify_message(msg),
            _ => ErrorKind::Other,
        }
    }

    /// Returns true if this error means the key was absent.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Returns true if this error means the handle was already closed.
    pub fn is_closed(&self) -> bool {
        self.kind() == ErrorKind::Closed
    }
}

/// Classifies a textual engine error.
pub fn classify_message(msg: &str) -> ErrorKind {
    let lowered = msg.trim().to_ascii_lowercase();

    if NOT_FOUND_RENDERINGS.contains(&lowered.as_str()) {
        return ErrorKind::NotFound;
    }
    if CLOSED_RENDERINGS.contains(&lowered.as_str()) {
        return ErrorKind::Closed;
    }

    if NOT_FOUND_RENDERINGS.iter().any(|r| lowered.contains(r)) {
        ErrorKind::NotFound
    } else if CLOSED_PHRASES.iter().any(|r| lowered.contains(r)) {
        ErrorKind::Closed
    } else {
        ErrorKind::Other
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::LockPoisoned => write!(f, "Lock poisoned"),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Error::Entropy(msg) => write!(f, "Entropy source unavailable: {}", msg),
            Error::NotFound => write!(f, "key not found"),
            Error::Closed => write!(f, "engine is closed"),
            Error::Engine(msg) => write!(f, "{}", msg),
            Error::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for kvprobe operations.
pub type Result<T> = std::result::Result<T, Error>;
