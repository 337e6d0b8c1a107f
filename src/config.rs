use crate::models::{Category, StorageError};
use crate::storage::config::StorageConfig;
use crate::storage::{Storage, StorageType};
use crate::view::SortMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Overrides the default config file location.
pub const CONFIG_ENV: &str = "RTASKS_CONFIG";

pub const KEYS: &[&str] = &[
    "storage.type",
    "storage.path",
    "owner",
    "default-sort",
    "default-category",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Invalid key: {0} (valid keys: {})", KEYS.join(", "))]
    InvalidKey(String),
}

fn validate_storage_path(path: &str) -> Result<PathBuf, ConfigError> {
    // Check for null bytes and other invalid characters
    if path.contains('\0') {
        return Err(ConfigError::InvalidConfig(
            "Path contains invalid characters".to_string(),
        ));
    }

    if path.trim().is_empty() {
        return Err(ConfigError::InvalidConfig(
            "Path cannot be empty".to_string(),
        ));
    }

    let path = shellexpand::tilde(path);
    let path = PathBuf::from(path.as_ref());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            return Err(ConfigError::InvalidConfig(format!(
                "Parent directory does not exist: {}",
                parent.display()
            )));
        }

        // Check if directory is writable
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            if let Ok(metadata) = parent.metadata() {
                if metadata.mode() & 0o200 == 0 {
                    return Err(ConfigError::InvalidConfig(format!(
                        "Directory is not writable: {}",
                        parent.display()
                    )));
                }
            }
        }
    }

    Ok(path)
}

fn validate_storage_type(value: &str) -> Result<StorageType, ConfigError> {
    value.parse().map_err(|_| {
        ConfigError::InvalidConfig(format!(
            "storage.type must be one of: {}",
            StorageType::VALID.join(", ")
        ))
    })
}

fn validate_owner(value: &str) -> Result<String, ConfigError> {
    let owner = value.trim();
    if owner.is_empty() || owner.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidConfig(
            "owner must be a non-empty id without spaces".to_string(),
        ));
    }
    Ok(owner.to_string())
}

fn validate_sort(value: &str) -> Result<SortMode, ConfigError> {
    SortMode::from_label(value).ok_or_else(|| {
        let labels: Vec<&str> = SortMode::ALL.iter().map(|m| m.label()).collect();
        ConfigError::InvalidConfig(format!(
            "default-sort must be one of: {}",
            labels.join(", ")
        ))
    })
}

fn validate_category(value: &str) -> Result<Category, ConfigError> {
    value
        .parse()
        .map_err(|e: crate::models::TaskError| ConfigError::InvalidConfig(e.to_string()))
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub storage_type: Option<String>,
    #[serde(default)]
    pub storage_path: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub default_sort: Option<String>,
    #[serde(default)]
    pub default_category: Option<String>,
}

fn config_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::InvalidConfig("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".config").join("rtasks"))
}

/// `$RTASKS_CONFIG`, falling back to `~/.config/rtasks/config.json`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(config_dir()?.join("config.json")),
    }
}

pub fn default_storage_path(storage_type: StorageType) -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(storage_type.default_file_name()))
}

pub struct ConfigManager {
    path: PathBuf,
    config: Config,
}

impl ConfigManager {
    pub fn new(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(path) => path.to_path_buf(),
            None => default_config_path()?,
        };
        let path = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).to_string());

        let config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                Config::default()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            Config::default()
        };

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(Self { path, config })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Writes `config` to disk; the caller adopts it only once this succeeds.
    fn save(&self, config: &Config) -> Result<(), ConfigError> {
        // Create parent directories if they don't exist
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, json)?;

        // Verify the write was successful by reading back
        let contents = std::fs::read_to_string(&self.path)?;
        let read_back: Config = serde_json::from_str(&contents)?;
        if read_back != *config {
            return Err(ConfigError::InvalidConfig(
                "Config integrity check failed".to_string(),
            ));
        }
        Ok(())
    }

    /// The stored value for `key`, without defaults.
    pub fn get(&self, key: &str) -> Option<String> {
        let config = &self.config;
        match key {
            "storage.type" => config.storage_type.clone(),
            "storage.path" => config.storage_path.clone(),
            "owner" => config.owner.clone(),
            "default-sort" => config.default_sort.clone(),
            "default-category" => config.default_category.clone(),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut config = self.config.clone();

        match key {
            "storage.type" => {
                let storage_type = validate_storage_type(value)?;
                if config.storage_type.as_deref() != Some(storage_type.as_str()) {
                    tracing::warn!(
                        to = %storage_type,
                        "changing storage type does not migrate existing tasks"
                    );
                }
                config.storage_type = Some(storage_type.to_string());
            }
            "storage.path" => {
                let path = validate_storage_path(value)?;
                config.storage_path = Some(path.to_string_lossy().to_string());
            }
            "owner" => {
                config.owner = Some(validate_owner(value)?);
            }
            "default-sort" => {
                config.default_sort = Some(validate_sort(value)?.label().to_string());
            }
            "default-category" => {
                config.default_category = Some(validate_category(value)?.to_string());
            }
            _ => {
                return Err(ConfigError::InvalidKey(key.to_string()));
            }
        }

        self.save(&config)?;
        self.config = config;
        tracing::info!(key, "config value set");
        Ok(())
    }

    pub fn unset(&mut self, key: &str) -> Result<(), ConfigError> {
        let mut config = self.config.clone();
        match key {
            "storage.type" => config.storage_type = None,
            "storage.path" => config.storage_path = None,
            "owner" => config.owner = None,
            "default-sort" => config.default_sort = None,
            "default-category" => config.default_category = None,
            _ => return Err(ConfigError::InvalidKey(key.to_string())),
        }
        self.save(&config)?;
        self.config = config;
        Ok(())
    }

    /// Every key with its effective value; the flag marks built-in defaults.
    /// Keys with neither a stored value nor a default are left out.
    pub fn list(&self) -> Vec<(String, String, bool)> {
        let mut list = Vec::new();
        for key in KEYS {
            if let Some(value) = self.get(key) {
                list.push((key.to_string(), value, false));
            } else if let Some(value) = self.default_value(key) {
                list.push((key.to_string(), value, true));
            }
        }
        list
    }

    fn default_value(&self, key: &str) -> Option<String> {
        match key {
            "storage.type" => Some(StorageType::default().to_string()),
            "storage.path" => default_storage_path(self.storage_type())
                .ok()
                .map(|p| p.to_string_lossy().to_string()),
            "default-category" => Some(Category::default().to_string()),
            _ => None,
        }
    }

    /// The configured backend. A hand-edited unknown value falls back to JSON.
    pub fn storage_type(&self) -> StorageType {
        match self.config.storage_type.as_deref() {
            None => StorageType::default(),
            Some(value) => value.parse().unwrap_or_else(|_| {
                tracing::warn!(value, "unknown storage.type in config, using json");
                StorageType::default()
            }),
        }
    }

    pub fn storage_path(&self) -> Result<PathBuf, ConfigError> {
        match self.config.storage_path.as_deref() {
            Some(path) => Ok(PathBuf::from(shellexpand::tilde(path).to_string())),
            None => default_storage_path(self.storage_type()),
        }
    }

    pub fn owner(&self) -> Option<&str> {
        self.config.owner.as_deref()
    }

    pub fn default_sort(&self) -> Option<SortMode> {
        self.config
            .default_sort
            .as_deref()
            .and_then(SortMode::from_label)
    }

    pub fn default_category(&self) -> Category {
        self.config
            .default_category
            .as_deref()
            .map(Category::from_store)
            .unwrap_or_default()
    }

    pub fn create_storage(&self) -> Result<Box<dyn Storage>, ConfigError> {
        let storage_config = StorageConfig::from_config_manager(self)?;
        Ok(storage_config.open()?)
    }
}
