use crate::config::ConfigManager;
use crate::models::StorageData;
use crate::storage::json::JsonStorage;
use crate::storage::Storage;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestStorage {
    temp_dir: TempDir,
    storage: Box<dyn Storage>,
}

#[allow(dead_code)] // Not every helper is used by every test module
impl TestStorage {
    pub fn new() -> Self {
        let temp_dir = tempfile::Builder::new()
            .prefix("rtasks_test")
            .tempdir()
            .expect("Failed to create temporary directory");

        let storage = Box::new(JsonStorage::new(temp_dir.path().join("test_storage.json")));

        // Initialize with empty data
        storage
            .save(&StorageData::new())
            .expect("Failed to initialize test storage");

        Self { temp_dir, storage }
    }

    pub fn storage(&self) -> &dyn Storage {
        &*self.storage
    }

    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }
}

/// Creates a configuration manager whose config file and data file both live
/// in a temporary directory, so tests never touch the user's real setup.
pub fn create_test_config_manager() -> (ConfigManager, TempDir) {
    let temp_dir = tempfile::Builder::new()
        .prefix("rtasks_test")
        .tempdir()
        .expect("Failed to create temporary directory");

    let config_path = temp_dir.path().join("config.json");
    let storage_path = temp_dir.path().join("test-data.json");

    let mut config_manager =
        ConfigManager::new(Some(&config_path)).expect("Failed to create config manager");
    config_manager
        .set("storage.path", storage_path.to_str().expect("utf-8 temp path"))
        .expect("Failed to set storage.path");

    (config_manager, temp_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_initialization() {
        let test_storage = TestStorage::new();
        let data = test_storage
            .storage()
            .load()
            .expect("Failed to load storage");
        assert!(data.tasks.is_empty());
        assert!(data.private_tasks.is_empty());
        assert!(test_storage.path().join("test_storage.json").exists());
    }

    #[test]
    fn test_config_manager() {
        let (config_manager, _temp_dir) = create_test_config_manager();

        let storage_path = config_manager
            .get("storage.path")
            .expect("Storage path not set");
        assert!(storage_path.contains("rtasks_test"));

        let storage = config_manager.create_storage().unwrap();
        assert!(storage.load().is_ok());
    }
}
