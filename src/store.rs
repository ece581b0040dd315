//! Durable storage for the task collection.
//!
//! The whole collection lives under a single key as one JSON array. Stores only
//! move bytes; the repository decides when to load and save.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::StoreError;
use crate::task::Task;

/// Key the collection is stored under.
pub const TASKS_KEY: &str = "tasks";

/// Backing store for the serialized collection.
pub trait TaskStore: Send + 'static {
    /// Load the collection. `Ok(None)` means nothing has been saved yet.
    fn load(&self) -> Result<Option<Vec<Task>>, StoreError>;

    /// Replace the stored collection.
    fn save(&self, tasks: &[Task]) -> Result<(), StoreError>;
}

/// Serialize a collection to the stored byte format.
pub fn encode(tasks: &[Task]) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec_pretty(tasks).map_err(StoreError::Encode)
}

/// Parse stored bytes back into a collection.
pub fn decode(bytes: &[u8]) -> Result<Vec<Task>, StoreError> {
    serde_json::from_slice(bytes).map_err(StoreError::Decode)
}

/// Collection stored as a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store `tasks.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(format!("{TASKS_KEY}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io { path, source }
}

impl TaskStore for FileStore {
    fn load(&self) -> Result<Option<Vec<Task>>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path).map_err(io_err(&self.path))?;
        decode(&bytes).map(Some)
    }

    /// Atomic-ish write via temp file + rename.
    fn save(&self, tasks: &[Task]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }
        let data = encode(tasks)?;
        let tmp = self.path.with_extension("json.tmp");
        let mut f = File::create(&tmp).map_err(io_err(&tmp))?;
        f.write_all(&data).map_err(io_err(&tmp))?;
        f.flush().map_err(io_err(&tmp))?;
        fs::rename(&tmp, &self.path).map_err(io_err(&self.path))?;
        debug!(path = %self.path.display(), count = tasks.len(), "saved tasks");
        Ok(())
    }
}

/// Shared in-memory key-value store. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw bytes currently stored under [`TASKS_KEY`].
    pub fn raw(&self) -> Result<Option<Vec<u8>>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(TASKS_KEY).cloned())
    }

    /// Seed the store with raw bytes, as if written by an earlier session.
    pub fn put_raw(&self, bytes: Vec<u8>) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(TASKS_KEY.to_string(), bytes);
        Ok(())
    }
}

impl TaskStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<Task>>, StoreError> {
        self.raw()?.map(|bytes| decode(&bytes)).transpose()
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StoreError> {
        self.put_raw(encode(tasks)?)
    }
}
