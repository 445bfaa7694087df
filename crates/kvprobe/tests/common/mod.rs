// Common test utilities for harness integration tests

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use kvprobe::{
    Engine, EngineConfig, EngineOpener, Error, HarnessConfig, MemoryEngine, MemoryOpener,
    Provisioner, Result,
};
use tempfile::TempDir;

/// One call made against a [`RecordingEngine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Put(String),
    Get(String),
    Exists(String),
    Delete(String),
    Close,
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

fn text(key: &[u8]) -> String {
    String::from_utf8_lossy(key).into_owned()
}

/// Reference engine that logs every call and can slow its puts down
pub struct RecordingEngine {
    inner: MemoryEngine,
    calls: CallLog,
    put_delay: Option<Duration>,
}

impl RecordingEngine {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Engine for RecordingEngine {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.record(Call::Put(text(key)));
        if let Some(delay) = self.put_delay {
            thread::sleep(delay);
        }
        self.inner.put(key, value)
    }

    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.record(Call::Get(text(key)));
        self.inner.get(key)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.record(Call::Delete(text(key)));
        self.inner.delete(key)
    }

    fn exists(&self, key: &[u8]) -> Result<bool> {
        self.record(Call::Exists(text(key)));
        self.inner.exists(key)
    }

    fn close(&self) -> Result<()> {
        self.record(Call::Close);
        self.inner.close()
    }
}

/// Opens [`RecordingEngine`]s that share one call log
#[derive(Clone, Default)]
pub struct RecordingOpener {
    pub calls: CallLog,
    pub put_delay: Option<Duration>,
}

#[allow(dead_code)]
impl RecordingOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_put_delay(mut self, delay: Duration) -> Self {
        self.put_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl EngineOpener for RecordingOpener {
    type Engine = RecordingEngine;

    fn open(&self, location: &Path, config: &EngineConfig) -> Result<RecordingEngine> {
        Ok(RecordingEngine {
            inner: MemoryOpener.open(location, config)?,
            calls: Arc::clone(&self.calls),
            put_delay: self.put_delay,
        })
    }
}

/// Opener that can never open an engine
#[allow(dead_code)]
#[derive(Clone, Copy, Default)]
pub struct FailingOpener;

impl EngineOpener for FailingOpener {
    type Engine = MemoryEngine;

    fn open(&self, _location: &Path, _config: &EngineConfig) -> Result<MemoryEngine> {
        Err(Error::Engine("storage backend unavailable".to_string()))
    }
}

/// Engine whose writes always fail
#[allow(dead_code)]
pub struct FailingPutEngine;

impl Engine for FailingPutEngine {
    fn put(&self, _key: &[u8], _value: &[u8]) -> Result<()> {
        Err(Error::Engine("write rejected: disk full".to_string()))
    }

    fn get(&self, _key: &[u8]) -> Result<Vec<u8>> {
        Err(Error::NotFound)
    }

    fn delete(&self, _key: &[u8]) -> Result<()> {
        Ok(())
    }

    fn exists(&self, _key: &[u8]) -> Result<bool> {
        Ok(false)
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Opens [`FailingPutEngine`]s
#[allow(dead_code)]
#[derive(Clone, Copy, Default)]
pub struct FailingPutOpener;

impl EngineOpener for FailingPutOpener {
    type Engine = FailingPutEngine;

    fn open(&self, location: &Path, _config: &EngineConfig) -> Result<FailingPutEngine> {
        fs::create_dir_all(location)?;
        Ok(FailingPutEngine)
    }
}

/// Reference engine whose close reports an I/O failure mentioning "closed"
#[allow(dead_code)]
pub struct FailingCloseEngine {
    inner: MemoryEngine,
}

impl Engine for FailingCloseEngine {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.inner.put(key, value)
    }

    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.inner.get(key)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.inner.delete(key)
    }

    fn exists(&self, key: &[u8]) -> Result<bool> {
        self.inner.exists(key)
    }

    fn close(&self) -> Result<()> {
        self.inner.close()?;
        Err(Error::Engine(
            "flush failed before handle closed: disk full".to_string(),
        ))
    }
}

/// Opens [`FailingCloseEngine`]s
#[allow(dead_code)]
#[derive(Clone, Copy, Default)]
pub struct FailingCloseOpener;

impl EngineOpener for FailingCloseOpener {
    type Engine = FailingCloseEngine;

    fn open(&self, location: &Path, config: &EngineConfig) -> Result<FailingCloseEngine> {
        Ok(FailingCloseEngine {
            inner: MemoryOpener.open(location, config)?,
        })
    }
}

/// Test fixture with a private temp root for provisioned instances
pub struct ProbeFixture {
    #[allow(dead_code)]
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

#[allow(dead_code)]
impl ProbeFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self { temp_dir, root }
    }

    pub fn config(&self) -> HarnessConfig {
        HarnessConfig::default()
            .with_temp_root(&self.root)
            .with_prefix("it")
    }

    pub fn provisioner<O: EngineOpener>(&self, opener: O) -> Provisioner<O> {
        Provisioner::new(opener, self.config())
    }

    pub fn memory_provisioner(&self) -> Provisioner<MemoryOpener> {
        self.provisioner(MemoryOpener)
    }

    pub fn list_locations(&self) -> Vec<String> {
        fs::read_dir(&self.root)
            .expect("Failed to read temp root")
            .filter_map(|entry| {
                entry
                    .ok()
                    .and_then(|e| e.file_name().to_str().map(String::from))
            })
            .collect()
    }
}

impl Default for ProbeFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_starts_empty() {
        let fixture = ProbeFixture::new();
        assert!(fixture.root.is_dir());
        assert!(fixture.list_locations().is_empty());
    }
}
