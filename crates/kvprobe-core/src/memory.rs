//! Reference engine.
//!
//! An in-memory store that honours the full capability contract, including
//! the on-disk footprint of its storage location. On close it writes a
//! checksummed snapshot so a reopened engine sees the same data.
//!
//! Snapshot format (binary):
//! [crc32: u32 LE] [bincode(HashMap<key, value>)]

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Engine, EngineConfig, EngineOpener, Error, Result};

/// Snapshot file name inside the storage location
pub const SNAPSHOT_FILE: &str = "DATA_SNAPSHOT";

type Store = HashMap<Vec<u8>, Vec<u8>>;

/// Snapshot body; encodes exactly as the bare map
#[derive(Serialize, Deserialize)]
struct SnapshotBody<'a> {
    entries: Cow<'a, Store>,
}

/// Thread-safe in-memory engine bound to a storage location.
#[derive(Debug)]
pub struct MemoryEngine {
    path: PathBuf,
    sync_writes: bool,
    store: RwLock<Store>,
    closed: AtomicBool,
}

impl MemoryEngine {
    /// Opens an engine at `config.path`, restoring a snapshot if one exists.
    pub fn open(config: &EngineConfig) -> Result<Self> {
        let path = config.path.clone();

        if !path.exists() {
            if !config.create_if_missing {
                return Err(Error::InvalidOperation(format!(
                    "Storage location does not exist: {:?}",
                    path
                )));
            }
            fs::create_dir_all(&path)?;
        }

        let store = load_snapshot(&path.join(SNAPSHOT_FILE))?;
        debug!(path = %path.display(), keys = store.len(), "memory engine opened");

        Ok(Self {
            path,
            sync_writes: config.sync_writes,
            store: RwLock::new(store),
            closed: AtomicBool::new(false),
        })
    }

    /// Storage location of this engine
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of live keys
    pub fn len(&self) -> Result<usize> {
        self.ensure_open()?;
        let store = self.store.read().map_err(|_| Error::LockPoisoned)?;
        Ok(store.len())
    }

    /// Returns true if no keys are stored
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Returns true once [`Engine::close`] has succeeded
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        Ok(())
    }

    fn persist(&self, store: &Store) -> Result<()> {
        write_snapshot(&self.path.join(SNAPSHOT_FILE), store)
    }
}

impl Engine for MemoryEngine {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.ensure_open()?;
        let mut store = self.store.write().map_err(|_| Error::LockPoisoned)?;
        store.insert(key.to_vec(), value.to_vec());
        if self.sync_writes {
            self.persist(&store)?;
        }
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.ensure_open()?;
        let store = self.store.read().map_err(|_| Error::LockPoisoned)?;
        store.get(key).cloned().ok_or(Error::NotFound)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.ensure_open()?;
        let mut store = self.store.write().map_err(|_| Error::LockPoisoned)?;
        if store.remove(key).is_some() && self.sync_writes {
            self.persist(&store)?;
        }
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> Result<bool> {
        self.ensure_open()?;
        let store = self.store.read().map_err(|_| Error::LockPoisoned)?;
        Ok(store.contains_key(key))
    }

    fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(Error::Closed);
        }

        let store = self.store.read().map_err(|_| Error::LockPoisoned)?;
        self.persist(&store)?;
        debug!(path = %self.path.display(), keys = store.len(), "memory engine closed");
        Ok(())
    }
}

/// Opener for [`MemoryEngine`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryOpener;

impl EngineOpener for MemoryOpener {
    type Engine = MemoryEngine;

    fn open(&self, location: &Path, config: &EngineConfig) -> Result<MemoryEngine> {
        if config.path != location {
            return Err(Error::InvalidOperation(format!(
                "Config path {:?} does not match location {:?}",
                config.path, location
            )));
        }
        MemoryEngine::open(config)
    }
}

fn write_snapshot(path: &Path, store: &Store) -> Result<()> {
    let body = SnapshotBody {
        entries: Cow::Borrowed(store),
    };
    let payload = bincode::serialize(&body)?;
    let checksum = crc32fast::hash(&payload);

    let mut bytes = Vec::with_capacity(payload.len() + 4);
    bytes.extend_from_slice(&checksum.to_le_bytes());
    bytes.extend_from_slice(&payload);

    // Write-then-rename; readers never observe a torn snapshot
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, &bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn load_snapshot(path: &Path) -> Result<Store> {
    if !path.exists() {
        return Ok(Store::new());
    }

    let bytes = fs::read(path)?;
    if bytes.len() < 4 {
        return Err(Error::Serialization(format!(
            "Snapshot too short: {} bytes",
            bytes.len()
        )));
    }

    let (header, payload) = bytes.split_at(4);
    let expected = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let actual = crc32fast::hash(payload);
    if expected != actual {
        return Err(Error::Serialization(format!(
            "Snapshot checksum mismatch: expected {:08x}, got {:08x}",
            expected, actual
        )));
    }

    let body: SnapshotBody<'static> = bincode::deserialize(payload)?;
    Ok(body.entries.into_owned())
}
