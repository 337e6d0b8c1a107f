use super::{Storage, StorageError};
use crate::models::StorageData;
use std::path::{Path, PathBuf};

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_string_lossy();
        Self {
            path: PathBuf::from(shellexpand::tilde(&path).to_string()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for JsonStorage {
    fn save(&self, data: &StorageData) -> Result<(), StorageError> {
        // Validate data before saving
        data.validate()?;

        // Create parent directories if they don't exist
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, json)?;

        // Verify the write was successful by reading back
        let contents = std::fs::read_to_string(&self.path)?;
        let read_data: StorageData = serde_json::from_str(&contents)?;

        if read_data.tasks.len() != data.tasks.len()
            || read_data.private_tasks.len() != data.private_tasks.len()
            || read_data.pins.len() != data.pins.len()
        {
            return Err(StorageError::Storage(
                "Data integrity check failed".to_string(),
            ));
        }

        tracing::debug!(
            path = %self.path.display(),
            tasks = data.tasks.len(),
            private_tasks = data.private_tasks.len(),
            "saved json storage"
        );
        Ok(())
    }

    fn load(&self) -> Result<StorageData, StorageError> {
        if !self.path.exists() {
            return Ok(StorageData::new());
        }

        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(StorageData::new());
        }

        let data: StorageData = serde_json::from_str(&contents)?;
        data.validate()?;
        Ok(data)
    }
}
