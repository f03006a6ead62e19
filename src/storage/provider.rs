//! Storage providers: where persisted values physically live.
//!
//! Providers deal in JSON text per key; typing and caching happen one level
//! up, in [`PersistentStore`](super::PersistentStore).

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::{Map, Value};

/// Errors from reading or writing persisted values.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupt storage file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

/// A key/value backing store for persisted values.
pub trait AppStorageProvider: Send + Sync {
    /// Store the JSON encoding of a value under `key`.
    fn persist(&self, key: &str, json: &str) -> Result<(), StorageError>;

    /// The JSON stored under `key`, if any.
    fn retrieve(&self, key: &str) -> Result<Option<String>, StorageError>;
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// Keeps values in memory for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated with raw JSON entries.
    pub fn with_entries<K: Into<String>, V: Into<String>>(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }
}

impl AppStorageProvider for MemoryStorage {
    fn persist(&self, key: &str, json: &str) -> Result<(), StorageError> {
        self.entries.lock().insert(key.to_owned(), json.to_owned());
        Ok(())
    }

    fn retrieve(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }
}

// ---------------------------------------------------------------------------
// JsonFileStorage
// ---------------------------------------------------------------------------

/// Keeps every value in one JSON object on disk.
///
/// The file is read on first access. Each write rewrites the whole file
/// through a sibling temporary file, so a crash mid-write leaves the
/// previous contents intact.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    entries: Mutex<Option<Map<String, Value>>>,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(err.into()),
        };
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&text)? {
            Value::Object(map) => Ok(map),
            other => Err(StorageError::Corrupt {
                path: self.path.clone(),
                reason: format!("expected a JSON object at the top level, found {}", json_type(&other)),
            }),
        }
    }

    fn write(&self, entries: &Map<String, Value>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp = self.path.with_extension("json.tmp");
        fs::write(&temp, serde_json::to_string_pretty(entries)?)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

impl AppStorageProvider for JsonFileStorage {
    fn persist(&self, key: &str, json: &str) -> Result<(), StorageError> {
        let value: Value = serde_json::from_str(json)?;
        let mut entries = self.entries.lock();
        if entries.is_none() {
            *entries = Some(self.load()?);
        }
        let map = entries.get_or_insert_with(Map::new);
        map.insert(key.to_owned(), value);
        self.write(map)
    }

    fn retrieve(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut entries = self.entries.lock();
        if entries.is_none() {
            *entries = Some(self.load()?);
        }
        match entries.as_ref().and_then(|map| map.get(key)) {
            Some(value) => Ok(Some(serde_json::to_string(value)?)),
            None => Ok(None),
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_round_trip() {
        let storage = MemoryStorage::new();
        storage.persist("volume", "7").unwrap();
        assert_eq!(storage.retrieve("volume").unwrap().as_deref(), Some("7"));
        assert_eq!(storage.retrieve("missing").unwrap(), None);
    }

    #[test]
    fn file_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let first = JsonFileStorage::new(&path);
        first.persist("name", "\"ada\"").unwrap();
        first.persist("count", "3").unwrap();

        let second = JsonFileStorage::new(&path);
        assert_eq!(second.retrieve("name").unwrap().as_deref(), Some("\"ada\""));
        assert_eq!(second.retrieve("count").unwrap().as_deref(), Some("3"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nested").join("absent.json"));
        assert_eq!(storage.retrieve("anything").unwrap(), None);
        storage.persist("anything", "true").unwrap();
        assert!(storage.path().exists());
    }

    #[test]
    fn non_object_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let err = JsonFileStorage::new(&path).retrieve("x").unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }), "{err}");
    }

    #[test]
    fn malformed_file_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStorage::new(&path).retrieve("x").unwrap_err();
        assert!(matches!(err, StorageError::Json(_)), "{err}");
    }
}
