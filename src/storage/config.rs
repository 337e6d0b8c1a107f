use super::{create_storage, Storage, StorageError, StorageType};
use crate::config::{ConfigError, ConfigManager};
use std::path::PathBuf;

/// Where and how tasks are persisted, resolved from the user's config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub storage_type: StorageType,
    pub storage_path: PathBuf,
}

impl StorageConfig {
    pub fn from_config_manager(manager: &ConfigManager) -> Result<Self, ConfigError> {
        Ok(Self {
            storage_type: manager.storage_type(),
            storage_path: manager.storage_path()?,
        })
    }

    pub fn open(&self) -> Result<Box<dyn Storage>, StorageError> {
        create_storage(self.storage_type, &self.storage_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::create_test_config_manager;

    #[test]
    fn test_storage_config_from_manager() {
        let (manager, temp_dir) = create_test_config_manager();
        let config = StorageConfig::from_config_manager(&manager).unwrap();
        assert_eq!(config.storage_type, StorageType::Json);
        assert_eq!(config.storage_path, temp_dir.path().join("test-data.json"));
    }

    #[test]
    fn test_storage_config_from_manager_with_custom_type() {
        let (mut manager, temp_dir) = create_test_config_manager();
        manager.set("storage.type", "sqlite").unwrap();
        let config = StorageConfig::from_config_manager(&manager).unwrap();
        assert_eq!(config.storage_type, StorageType::Sqlite);
        assert_eq!(config.storage_path, temp_dir.path().join("test-data.json"));
    }

    #[test]
    fn test_storage_config_with_invalid_type_on_disk() {
        let (manager, temp_dir) = create_test_config_manager();

        let mut config = manager.config().clone();
        config.storage_type = Some("invalid".to_string());
        std::fs::write(manager.path(), serde_json::to_string(&config).unwrap()).unwrap();

        let reopened = ConfigManager::new(Some(manager.path())).unwrap();
        let storage_config = StorageConfig::from_config_manager(&reopened).unwrap();
        assert_eq!(storage_config.storage_type, StorageType::Json); // Should default to Json
        assert_eq!(storage_config.storage_path, temp_dir.path().join("test-data.json"));
    }

    #[test]
    fn test_open_creates_usable_storage() {
        let (manager, _temp_dir) = create_test_config_manager();
        let storage = StorageConfig::from_config_manager(&manager)
            .unwrap()
            .open()
            .unwrap();
        assert!(storage.load().unwrap().tasks.is_empty());
    }
}
