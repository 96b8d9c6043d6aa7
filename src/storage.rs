use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use directories::ProjectDirs;
use tracing::{debug, error, trace, warn};

use crate::error::StorageError;

pub const STORE_FILE_NAME: &str = "store.json";
/// Where an unreadable store is moved before starting over
pub const CORRUPT_FILE_NAME: &str = "store.json.bad";

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("fyi", "angelo", "hydrate-reminder")
}

/// String-keyed, string-valued persistence.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// All keys live in a single JSON object on disk. The file is rewritten on
/// every `set`.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Opens `store.json` inside `data_dir`, creating the directory if needed.
    ///
    /// A file that is not a JSON object of strings is moved to
    /// [`CORRUPT_FILE_NAME`] and the store starts empty.
    pub fn open(data_dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(data_dir).map_err(|source| StorageError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;

        let path = data_dir.join(STORE_FILE_NAME);
        debug!("Data path: {:?}", path);

        let entries = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;
            match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    error!("Store at {:?} is corrupted, starting empty: {e}", path);
                    let aside = data_dir.join(CORRUPT_FILE_NAME);
                    if let Err(e) = fs::rename(&path, &aside) {
                        warn!("Unable to move corrupted store to {:?}: {e}", aside);
                    }
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_owned(), value.to_owned());

        let serialized = serde_json::to_string_pretty(&*entries)?;
        trace!(key, "Writing store to disk");
        fs::write(&self.path, serialized).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[derive(Default)]
pub struct MemoryStore(Mutex<BTreeMap<String, String>>);

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.0.lock().unwrap_or_else(|e| e.into_inner()).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_survives_reopen() {
        let dir = TempDir::new().unwrap();

        let store = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("goal").unwrap(), None);
        store.set("goal", "10").unwrap();
        store.set("theme", "dark").unwrap();

        let reopened = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("goal").unwrap().as_deref(), Some("10"));
        assert_eq!(reopened.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn file_store_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");

        let store = JsonFileStore::open(&nested).unwrap();
        store.set("glasses", "3").unwrap();
        assert!(nested.join(STORE_FILE_NAME).exists());
    }

    #[test]
    fn corrupted_file_is_set_aside() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(STORE_FILE_NAME), "not json").unwrap();

        let store = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("goal").unwrap(), None);
        assert_eq!(
            fs::read_to_string(dir.path().join(CORRUPT_FILE_NAME)).unwrap(),
            "not json"
        );
        assert!(!dir.path().join(STORE_FILE_NAME).exists());

        store.set("goal", "10").unwrap();
        let reopened = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("goal").unwrap().as_deref(), Some("10"));
    }
}
