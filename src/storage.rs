//! String-keyed persistent storage
//!
//! The identity store and the score ledger both sit on top of a simple
//! key-value contract. In a browser this is local storage; natively it can be
//! an in-memory map or a JSON file on disk.

use std::{
    cell::RefCell,
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    rc::Rc,
};

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur when reading or writing persistent storage
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The backing store cannot be reached (disabled, quota exceeded, I/O failure)
    #[error("storage is unavailable: {0}")]
    Unavailable(String),
    /// A stored value could not be decoded
    #[error("stored value is corrupt: {0}")]
    Corrupt(String),
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Corrupt(error.to_string())
    }
}

/// A string-keyed store of string values
///
/// All methods take `&self`: stores are handles onto shared state, the same
/// way two browser tabs share one local storage area.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Stores `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Removes the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn remove(&self, key: &str) -> Result<(), Error>;
}

/// In-memory store; clones share the same underlying map
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Store persisted as a single JSON object file
///
/// Every operation re-reads the file, so separate handles on the same path
/// observe each other's writes.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store backed by the file at `path`
    ///
    /// The file is created lazily on the first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn load(&self) -> Result<HashMap<String, String>, Error> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(HashMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(Error::Unavailable(e.to_string())),
        }
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<(), Error> {
        let contents = serde_json::to_string(entries)?;
        fs::write(&self.path, contents).map_err(|e| Error::Unavailable(e.to_string()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut entries = self.load()?;
        entries.insert(key.to_owned(), value.to_owned());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}
