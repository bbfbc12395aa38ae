use anyhow::{Context, Result};
use log::{debug, info};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::backend::storage::traits::{StateStore, StorageKey};

/// Environment variable naming an explicit data directory
pub const DATA_DIR_ENV: &str = "ARCADE_CONSOLE_DATA_DIR";

const DEFAULT_DIRECTORY_NAME: &str = "Arcade Console";

/// JsonFileStore keeps one `<key>.json` document per storage key in a data directory
#[derive(Clone)]
pub struct JsonFileStore {
    base_directory: PathBuf,
    /// What this handle last wrote, per key
    last_written: Arc<Mutex<HashMap<StorageKey, String>>>,
}

impl JsonFileStore {
    /// Open a store rooted at `base_directory`, creating the directory if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .with_context(|| format!("Failed to create data directory {}", base_path.display()))?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
            last_written: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Open the store in the default profile directory.
    ///
    /// `ARCADE_CONSOLE_DATA_DIR` overrides the location; otherwise the
    /// platform data directory is used (`~/.local/share/Arcade Console` on Linux).
    pub fn new_default() -> Result<Self> {
        let data_dir = Self::default_data_directory()?;
        info!("Using data directory: {}", data_dir.display());
        Self::new(data_dir)
    }

    pub fn default_data_directory() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                return Ok(PathBuf::from(dir.trim()));
            }
        }

        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| anyhow::anyhow!("Could not determine a data directory"))?;
        Ok(data_dir.join(DEFAULT_DIRECTORY_NAME))
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// File holding the document for `key`
    pub fn file_path(&self, key: StorageKey) -> PathBuf {
        self.base_directory.join(format!("{}.json", key.as_str()))
    }

    fn temp_path(&self, key: StorageKey) -> PathBuf {
        self.base_directory.join(format!(".{}.json.tmp", key.as_str()))
    }

    fn written(&self) -> MutexGuard<'_, HashMap<StorageKey, String>> {
        self.last_written.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StateStore for JsonFileStore {
    fn read(&self, key: StorageKey) -> Result<Option<String>> {
        let path = self.file_path(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn write(&self, key: StorageKey, contents: &str) -> Result<()> {
        let temp_path = self.temp_path(key);
        let path = self.file_path(key);

        // Write to a sibling temp file first so readers never see a torn document
        fs::write(&temp_path, contents)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to move {} into place", path.display()))?;

        debug!("Wrote {} ({} bytes)", path.display(), contents.len());
        self.written().insert(key, contents.to_string());
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> Result<()> {
        let path = self.file_path(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed {}", path.display());
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
        self.written().remove(&key);
        Ok(())
    }

    fn last_written(&self, key: StorageKey) -> Option<String> {
        self.written().get(&key).cloned()
    }

    fn forget_written(&self, key: StorageKey) {
        self.written().remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::json::test_utils::TestEnvironment;

    #[test]
    fn test_write_then_read() {
        let env = TestEnvironment::new().unwrap();

        env.store.write(StorageKey::Inventory, r#"[{"id":"C-1","balance":5}]"#).unwrap();

        let contents = env.store.read(StorageKey::Inventory).unwrap();
        assert_eq!(contents.as_deref(), Some(r#"[{"id":"C-1","balance":5}]"#));
        assert!(env.base_path.join("inventory.json").exists());
        assert!(!env.base_path.join(".inventory.json.tmp").exists());
    }

    #[test]
    fn test_missing_key_reads_none_and_removes_cleanly() {
        let env = TestEnvironment::new().unwrap();

        assert!(env.store.read(StorageKey::Logs).unwrap().is_none());
        assert!(env.store.remove(StorageKey::Logs).is_ok());
    }

    #[test]
    fn test_last_written_is_per_handle() {
        let env = TestEnvironment::new().unwrap();
        let other = JsonFileStore::new(&env.base_path).unwrap();

        env.store.write(StorageKey::Machines, "[]").unwrap();

        assert_eq!(env.store.last_written(StorageKey::Machines).as_deref(), Some("[]"));
        assert!(other.last_written(StorageKey::Machines).is_none());
        assert_eq!(other.read(StorageKey::Machines).unwrap().as_deref(), Some("[]"));

        env.store.remove(StorageKey::Machines).unwrap();
        assert!(env.store.last_written(StorageKey::Machines).is_none());

        env.store.write(StorageKey::Logs, "[]").unwrap();
        env.store.forget_written(StorageKey::Logs);
        assert!(env.store.last_written(StorageKey::Logs).is_none());
        assert_eq!(env.store.read(StorageKey::Logs).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_creates_missing_directory() {
        let env = TestEnvironment::new().unwrap();
        let nested = env.base_path.join("profiles").join("front-desk");

        let store = JsonFileStore::new(&nested).unwrap();

        assert!(nested.is_dir());
        assert_eq!(store.file_path(StorageKey::User), nested.join("user.json"));
    }
}
