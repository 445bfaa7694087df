//! Failure reporting sinks.
//!
//! A [`Reporter`] is the context a check reports into. Fatal failures abort
//! the current test or benchmark by panicking, so any [`Instance`] guards on
//! the stack still tear down while unwinding. Non-fatal failures are recorded
//! and surface when the context is dropped.
//!
//! [`Instance`]: crate::Instance

use std::sync::Mutex;

use tracing::{error, warn};

/// Sink for harness failures.
pub trait Reporter: Sync {
    /// Name of the owning test or benchmark
    fn name(&self) -> &str;

    /// Record a failure and abort immediately.
    fn fatal(&self, message: &str) -> !;

    /// Record a failure and keep going.
    fn error(&self, message: &str);
}

#[derive(Debug, Default)]
struct FailureLog {
    entries: Mutex<Vec<String>>,
}

impl FailureLog {
    fn push(&self, message: String) {
        // A poisoned log still holds every earlier failure
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push(message);
    }

    fn take(&self) -> Vec<String> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *entries)
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn check_on_drop(&self, kind: &str, name: &str) {
        if std::thread::panicking() {
            return;
        }
        let failures = self.take();
        if !failures.is_empty() {
            panic!(
                "{} {} recorded {} failure(s):\n  {}",
                kind,
                name,
                failures.len(),
                failures.join("\n  ")
            );
        }
    }
}

/// Context of a correctness test.
#[derive(Debug)]
pub struct TestContext {
    name: String,
    failures: FailureLog,
}

impl TestContext {
    /// Create a context for the test called `name`
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            failures: FailureLog::default(),
        }
    }

    /// Number of failures recorded so far
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Returns true if any failure was recorded
    pub fn failed(&self) -> bool {
        self.failure_count() > 0
    }

    /// Drain recorded failures so they are not reported on drop
    pub fn take_failures(&self) -> Vec<String> {
        self.failures.take()
    }
}

impl Reporter for TestContext {
    fn name(&self) -> &str {
        &self.name
    }

    fn fatal(&self, message: &str) -> ! {
        error!(test = %self.name, "{}", message);
        self.failures.push(message.to_string());
        panic!("{}: {}", self.name, message);
    }

    fn error(&self, message: &str) {
        warn!(test = %self.name, "{}", message);
        self.failures.push(message.to_string());
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.failures.check_on_drop("test", &self.name);
    }
}

/// Context of a benchmark case.
#[derive(Debug)]
pub struct BenchContext {
    name: String,
    failures: FailureLog,
}

impl BenchContext {
    /// Create a context for the benchmark called `name`
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            failures: FailureLog::default(),
        }
    }

    /// Number of failures recorded so far
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Drain recorded failures so they are not reported on drop
    pub fn take_failures(&self) -> Vec<String> {
        self.failures.take()
    }
}

impl Reporter for BenchContext {
    fn name(&self) -> &str {
        &self.name
    }

    fn fatal(&self, message: &str) -> ! {
        error!(bench = %self.name, "{}", message);
        self.failures.push(message.to_string());
        panic!("{}: {}", self.name, message);
    }

    fn error(&self, message: &str) {
        warn!(bench = %self.name, "{}", message);
        self.failures.push(message.to_string());
    }
}

impl Drop for BenchContext {
    fn drop(&mut self) {
        self.failures.check_on_drop("bench", &self.name);
    }
}
