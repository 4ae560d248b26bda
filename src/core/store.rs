//! Persistence adapter: key/value storage for the camera registry.
//!
//! The registry is written as one JSON array under [`CAMERAS_KEY`].
//! Reads never fail past this module: a missing or corrupt value is treated
//! as an empty registry. Write failures are returned to the caller, which
//! logs and absorbs them.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use log::{debug, warn};
use thiserror::Error;

use super::camera::CameraEntry;

/// Well-known key the registry snapshot is stored under.
pub const CAMERAS_KEY: &str = "cameras";

/// Storage read/write failure (PersistenceFailure).
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Minimal string key/value storage.
pub trait CameraStore: Send {
    /// `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// One file per key: `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CameraStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        // Write to a sibling temp file first so a crash never leaves half a snapshot
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-memory store. `failing` makes every write fail, used to exercise quota-style errors.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    failing: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { values: HashMap::new(), failing: true }
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let mut values = HashMap::new();
        values.insert(key.to_string(), value.to_string());
        Self { values, failing: false }
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl CameraStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        if self.failing {
            return Err(PersistenceError::Unavailable("storage quota exceeded".to_string()));
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Serialize entries as the persisted JSON array.
pub fn encode_entries(entries: &[CameraEntry]) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string_pretty(entries)?)
}

/// Parse a persisted JSON array. Errors are reported, not swallowed.
pub fn decode_entries(json: &str) -> Result<Vec<CameraEntry>, PersistenceError> {
    Ok(serde_json::from_str(json)?)
}

/// Read the registry snapshot; missing or corrupt data yields an empty list.
pub fn load_entries(store: &dyn CameraStore) -> Vec<CameraEntry> {
    let raw = match store.get(CAMERAS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("No saved cameras under '{}'", CAMERAS_KEY);
            return Vec::new();
        }
        Err(e) => {
            warn!("Failed to read saved cameras: {}", e);
            return Vec::new();
        }
    };

    match decode_entries(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Saved cameras are corrupt, starting empty: {}", e);
            Vec::new()
        }
    }
}

/// Write the registry snapshot.
pub fn save_entries(store: &mut dyn CameraStore, entries: &[CameraEntry]) -> Result<(), PersistenceError> {
    let json = encode_entries(entries)?;
    store.set(CAMERAS_KEY, &json)
}
