use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, TrackerError};

pub const TRACKER_DIR: &str = ".medtracker";

/// Durable key/value storage. Each key holds one text value, overwritten in full.
pub trait KeyValueStore {
    /// Read a key. An absent key is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite a key. Any failure is reported as `TrackerError::Persistence`.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Keys become file names, so only `[A-Za-z0-9._-]` without a leading dot.
pub fn check_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        && !key.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(TrackerError::Validation(format!("Invalid storage key: {:?}", key)))
    }
}

/// Keys stored as `<key>.json` files inside a project's `.medtracker/` directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Initialize a new medtracker project
    pub fn init(root: &Path) -> Result<Self> {
        let dir = root.join(TRACKER_DIR);

        if dir.exists() {
            return Err(TrackerError::AlreadyInitialized);
        }

        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Open an existing medtracker project
    pub fn open(root: &Path) -> Result<Self> {
        let dir = root.join(TRACKER_DIR);

        if !dir.is_dir() {
            return Err(TrackerError::NotInitialized);
        }

        Ok(Self { dir })
    }

    /// Get the `.medtracker/` directory path
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        check_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        let tmp = path.with_extension("json.tmp");

        // Write beside the target then rename, so readers never see a torn file.
        fs::write(&tmp, value)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| {
                let _ = fs::remove_file(&tmp);
                TrackerError::Persistence(format!("failed to write {}: {}", path.display(), e))
            })
    }
}

/// Volatile store for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: impl Into<String>) -> Self {
        let mut store = Self::new();
        store.values.insert(key.to_string(), value.into());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
