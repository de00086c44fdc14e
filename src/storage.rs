//! Persistent integer key-value storage.
//!
//! The plant needs exactly one slot: its [`DecayState`](crate::state_machine::DecayState)
//! code under [`PLANT_STATE_KEY`]. [`MemoryStore`] backs tests and dry runs,
//! [`FileStore`] keeps the values in a small JSON file between launches.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{Result, WiltError};

/// Key under which the current decay state is stored.
pub const PLANT_STATE_KEY: u32 = 1337;

/// Integer storage that outlives the process.
pub trait KeyValueStore {
    /// `Ok(None)` when nothing has been written under `key`.
    fn read_int(&self, key: u32) -> Result<Option<i32>>;

    fn write_int(&mut self, key: u32, value: i32) -> Result<()>;

    fn delete(&mut self, key: u32) -> Result<()>;
}

/// Volatile store; forgets everything when dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<u32, i32>,
}

impl KeyValueStore for MemoryStore {
    fn read_int(&self, key: u32) -> Result<Option<i32>> {
        Ok(self.values.get(&key).copied())
    }

    fn write_int(&mut self, key: u32, value: i32) -> Result<()> {
        self.values.insert(key, value);
        Ok(())
    }

    fn delete(&mut self, key: u32) -> Result<()> {
        self.values.remove(&key);
        Ok(())
    }
}

/// JSON-file store: `{"1337": 2}`.
///
/// The whole file is rewritten on every write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<u32, i32>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store, and so is
    /// one that can't be read or doesn't decode.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            match fs::read(&path) {
                Ok(bytes) => match serde_json::from_slice(&bytes) {
                    Ok(values) => values,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "discarding unreadable store");
                        BTreeMap::new()
                    }
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not read store, starting empty");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.storage_error(e))?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, json).map_err(|e| self.storage_error(e))
    }

    fn storage_error(&self, e: std::io::Error) -> WiltError {
        WiltError::Storage {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }
}

impl KeyValueStore for FileStore {
    fn read_int(&self, key: u32) -> Result<Option<i32>> {
        Ok(self.values.get(&key).copied())
    }

    fn write_int(&mut self, key: u32, value: i32) -> Result<()> {
        self.values.insert(key, value);
        self.flush()
    }

    fn delete(&mut self, key: u32) -> Result<()> {
        if self.values.remove(&key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
