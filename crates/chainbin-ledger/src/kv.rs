//! Durable local key-value store behind the ledger
//!
//! The contract is a browser-localStorage-sized surface: whole string
//! values under string keys, no transactions, no watch. `JsonFileKv`
//! maps each key to one file and writes atomically via temp + rename,
//! so a crash mid-write leaves the previous value intact. Concurrent
//! *processes* writing the same key race last-writer-wins; that is an
//! accepted property of the store, not something this layer hides.

use chainbin_core::ChainbinResult;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub trait LocalKv: Send {
    fn get(&self, key: &str) -> ChainbinResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> ChainbinResult<()>;
}

/// File-per-key store rooted at a directory.
pub struct JsonFileKv {
    root: PathBuf,
}

impl JsonFileKv {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl LocalKv for JsonFileKv {
    fn get(&self, key: &str) -> ChainbinResult<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> ChainbinResult<()> {
        std::fs::create_dir_all(&self.root)?;

        // Atomic write: temp file in the same directory, then rename.
        let path = self.key_path(key);
        let tmp_path = path.with_extension("tmp");
        std::fs::write(&tmp_path, value)?;
        std::fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryKv {
    entries: HashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalKv for MemoryKv {
    fn get(&self, key: &str) -> ChainbinResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> ChainbinResult<()> {
        self.entries.insert(key.into(), value.into());
        Ok(())
    }
}

/// Expand `~` in a configured store path to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_default();
        PathBuf::from(home).join(rest)
    } else {
        path.to_path_buf()
    }
}
