/// Test utilities for file-backed storage tests
///
/// Every test gets its own temporary data directory which is removed when the
/// environment is dropped, even if the test panics.
use anyhow::Result;
use std::path::PathBuf;
use tempfile::TempDir;

use super::connection::JsonFileStore;

pub struct TestEnvironment {
    /// Kept alive until drop
    _temp_dir: TempDir,
    pub store: JsonFileStore,
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();
        let store = JsonFileStore::new(&base_path)?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            store,
            base_path,
        })
    }

    /// A second handle on the same directory, as another console instance would open it
    pub fn second_instance(&self) -> Result<JsonFileStore> {
        JsonFileStore::new(&self.base_path)
    }
}
