//! Durable key-value storage for session data.
//!
//! [Storage] is the narrow interface the session store persists through.
//! [FileStorage] keeps everything in one JSON file so that a session survives
//! restarts, and [MemoryStorage] keeps it in memory for tests and throwaway
//! sessions.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use crate::Error;

/// The key under which the credential is stored.
pub const TOKEN_KEY: &str = "token";
/// The key under which the serialized profile is stored.
pub const USER_DATA_KEY: &str = "userData";

/// String key-value storage that outlives the process.
pub trait Storage {
    /// Get the value stored under `key`, or `None` if there is none.
    ///
    /// # Errors
    /// Returns [Error::Storage] if the underlying medium could not be read.
    fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store `value` under `key`, replacing any existing value.
    ///
    /// # Errors
    /// Returns [Error::Storage] if the underlying medium could not be written.
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Remove the value stored under `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    /// Returns [Error::Storage] if the underlying medium could not be written.
    fn remove(&self, key: &str) -> Result<(), Error>;
}

/// In-memory storage.
///
/// Cloning gives another handle to the same values.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, Error> {
        self.values
            .lock()
            .map_err(|_| Error::Storage("could not acquire the storage lock".to_owned()))
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.lock()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Storage backed by a single JSON object file.
///
/// The file is read on every [Storage::get] and rewritten on every change, so
/// separate runs of the application always see the latest values.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// The name of the file created inside the data directory.
    pub const FILE_NAME: &'static str = "session.json";

    /// Create storage that keeps its file in `data_dir`.
    ///
    /// The directory is created on the first write.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(Self::FILE_NAME),
        }
    }

    /// The path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, Error> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(error) => return Err(error.into()),
        };

        serde_json::from_str(&text).map_err(|error| {
            Error::Storage(format!(
                "could not parse {}: {error}",
                self.path.display()
            ))
        })
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let text = serde_json::to_string_pretty(values)
            .map_err(|error| Error::Storage(error.to_string()))?;

        // Write then rename so a crash never leaves a half-written file.
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, text)?;
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut values = self.read_all().unwrap_or_else(|error| {
            tracing::warn!("Discarding unreadable session storage: {error}");
            BTreeMap::new()
        });
        values.insert(key.to_owned(), value.to_owned());
        self.write_all(&values)
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        let mut values = match self.read_all() {
            Ok(values) => values,
            Err(error) => {
                tracing::warn!("Resetting unreadable session storage: {error}");
                return self.write_all(&BTreeMap::new());
            }
        };

        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod storage_tests {
    use std::fs;

    use tempfile::tempdir;

    use crate::storage::{FileStorage, MemoryStorage, Storage};

    #[test]
    fn memory_storage_round_trips_values() {
        let storage = MemoryStorage::new();

        storage.set("token", "abc").unwrap();

        assert_eq!(storage.get("token").unwrap(), Some("abc".to_owned()));
        storage.remove("token").unwrap();
        assert_eq!(storage.get("token").unwrap(), None);
    }

    #[test]
    fn memory_storage_clones_share_values() {
        let storage = MemoryStorage::new();
        let handle = storage.clone();

        storage.set("token", "abc").unwrap();

        assert_eq!(handle.get("token").unwrap(), Some("abc".to_owned()));
    }

    #[test]
    fn file_storage_persists_across_instances() {
        let dir = tempdir().unwrap();

        FileStorage::new(dir.path()).set("token", "abc").unwrap();
        let value = FileStorage::new(dir.path()).get("token").unwrap();

        assert_eq!(value, Some("abc".to_owned()));
    }

    #[test]
    fn file_storage_missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        assert_eq!(storage.get("token").unwrap(), None);
        assert!(storage.remove("token").is_ok());
    }

    #[test]
    fn file_storage_creates_missing_data_dir() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("nested").join("data");
        let storage = FileStorage::new(&data_dir);

        storage.set("token", "abc").unwrap();

        assert!(storage.path().is_file());
    }

    #[test]
    fn file_storage_remove_deletes_only_that_key() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.set("token", "abc").unwrap();
        storage.set("userData", "{}").unwrap();

        storage.remove("token").unwrap();

        assert_eq!(storage.get("token").unwrap(), None);
        assert_eq!(storage.get("userData").unwrap(), Some("{}".to_owned()));
    }

    #[test]
    fn file_storage_overwrites_corrupt_file_on_write() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        fs::write(storage.path(), "not json").unwrap();

        assert!(storage.get("token").is_err());
        storage.set("token", "abc").unwrap();

        assert_eq!(storage.get("token").unwrap(), Some("abc".to_owned()));
    }
}
