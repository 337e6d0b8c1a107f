use crate::models::StorageData;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub use crate::models::StorageError;

pub mod config;
pub mod json;
pub mod migrations;
pub mod sqlite;
mod task_store;

#[cfg(test)]
pub(crate) mod test_utils;

pub use json::JsonStorage;
pub use sqlite::SqliteStorage;
pub use task_store::{Collection, TaskStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageType {
    #[default]
    Json,
    Sqlite,
}

impl StorageType {
    pub const VALID: &'static [&'static str] = &["json", "sqlite"];

    pub fn as_str(self) -> &'static str {
        match self {
            StorageType::Json => "json",
            StorageType::Sqlite => "sqlite",
        }
    }

    pub fn default_file_name(self) -> &'static str {
        match self {
            StorageType::Json => "data.json",
            StorageType::Sqlite => "data.db",
        }
    }
}

impl FromStr for StorageType {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(StorageType::Json),
            "sqlite" => Ok(StorageType::Sqlite),
            _ => Err(StorageError::Storage(format!(
                "storage type must be one of: {}",
                Self::VALID.join(", ")
            ))),
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A backend holding one complete [`StorageData`] snapshot.
pub trait Storage: Send + Sync {
    fn save(&self, data: &StorageData) -> Result<(), StorageError>;
    fn load(&self) -> Result<StorageData, StorageError>;
}

pub fn create_storage(
    storage_type: StorageType,
    path: &Path,
) -> Result<Box<dyn Storage>, StorageError> {
    tracing::debug!(%storage_type, path = %path.display(), "opening storage");
    match storage_type {
        StorageType::Json => {
            let storage = JsonStorage::new(path);
            Ok(Box::new(storage))
        }
        StorageType::Sqlite => {
            let storage = SqliteStorage::new(path)?;
            Ok(Box::new(storage))
        }
    }
}
