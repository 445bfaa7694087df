//! Logging configuration for kvprobe
//!
//! Harness events (provisioning, teardown, fallback generation, failures) are
//! emitted through `tracing`. This module installs a subscriber for them, to
//! stdout, a daily rolling file, or both.

use std::path::{Path, PathBuf};

use kvprobe_core::{Error, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::HarnessConfig;

/// Log output destination
#[derive(Debug, Clone)]
pub enum LogOutput {
    /// Output to stdout
    Stdout,
    /// Output to a file with daily rotation
    File(PathBuf),
    /// Output to both stdout and file
    Both(PathBuf),
}

/// Log format style
#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    /// Human-readable multi-line format
    Pretty,
    /// Compact single-line format (default)
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level filter
    pub level: String,
    /// Output destination
    pub output: LogOutput,
    /// Format style
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: LogOutput::Stdout,
            format: LogFormat::Compact,
        }
    }
}

impl From<&HarnessConfig> for LogConfig {
    fn from(config: &HarnessConfig) -> Self {
        Self::default().with_level(config.log_level.clone())
    }
}

impl LogConfig {
    /// Create config with debug level
    pub fn debug() -> Self {
        Self {
            level: "debug".to_string(),
            ..Default::default()
        }
    }

    /// Set log output to file with rotation
    pub fn with_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::File(path.into());
        self
    }

    /// Set log output to both stdout and file
    pub fn with_both<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::Both(path.into());
        self
    }

    /// Set log format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set log level filter
    pub fn with_level<S: Into<String>>(mut self, level: S) -> Self {
        self.level = level.into();
        self
    }

    /// Initialize global logging with this configuration
    ///
    /// `RUST_LOG` takes precedence over the configured level. Returns a guard
    /// that must be kept alive while file output is in use. Fails if a global
    /// subscriber is already installed.
    ///
    /// ```rust,no_run
    /// use kvprobe::logging::LogConfig;
    ///
    /// let _guard = LogConfig::debug().init().expect("logging already initialized");
    /// ```
    pub fn init(self) -> Result<Option<WorkerGuard>> {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .map_err(|e| Error::InvalidOperation(format!("log level {:?}: {}", self.level, e)))?;

        let registry = tracing_subscriber::registry().with(env_filter);

        match self.output {
            LogOutput::Stdout => {
                let installed = match self.format {
                    LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
                    LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
                };
                installed.map_err(already_initialized)?;
                Ok(None)
            }
            LogOutput::File(path) => {
                let (writer, guard) = file_writer(&path);
                let installed = match self.format {
                    LogFormat::Pretty => registry
                        .with(fmt::layer().with_writer(writer).pretty())
                        .try_init(),
                    LogFormat::Compact => registry
                        .with(fmt::layer().with_writer(writer).compact())
                        .try_init(),
                };
                installed.map_err(already_initialized)?;
                Ok(Some(guard))
            }
            LogOutput::Both(path) => {
                let (writer, guard) = file_writer(&path);
                registry
                    .with(fmt::layer().compact())
                    .with(fmt::layer().with_writer(writer).with_ansi(false))
                    .try_init()
                    .map_err(already_initialized)?;
                Ok(Some(guard))
            }
        }
    }
}

/// Route harness logs into the test harness' captured output.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

fn file_writer(path: &Path) -> (tracing_appender::non_blocking::NonBlocking, WorkerGuard) {
    let file_appender = tracing_appender::rolling::daily(
        path.parent().unwrap_or_else(|| Path::new(".")),
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("kvprobe.log"),
    );
    tracing_appender::non_blocking(file_appender)
}

fn already_initialized(err: tracing_subscriber::util::TryInitError) -> Error {
    Error::InvalidOperation(format!("logging already initialized: {}", err))
}
