//! The PIN-gated private task collection.
//!
//! An owner first sets a 4-digit PIN, then unlocks the vault with it for
//! each session. Only an [`UnlockedVault`] can list or change private tasks.

use crate::models::{NewTask, StorageError, Task, TaskError, TaskPatch};
use crate::storage::{Collection, TaskStore};
use crate::task_manager::{find_by_prefix, LookupError};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const PIN_LENGTH: usize = 4;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("PIN must be exactly {} digits", PIN_LENGTH)]
    InvalidPinFormat,
    #[error("A PIN is already set for this account")]
    PinAlreadySet,
    #[error("No PIN set yet, set one first")]
    PinNotSet,
    #[error("Invalid PIN")]
    InvalidPin,
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub fn validate_pin(pin: &str) -> Result<(), VaultError> {
    if pin.len() == PIN_LENGTH && pin.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(VaultError::InvalidPinFormat)
    }
}

/// Hex SHA-256 of the PIN salted with its owner.
pub fn hash_pin(owner: &str, pin: &str) -> String {
    let digest = Sha256::digest(format!("{owner}:{pin}").as_bytes());
    hex::encode(digest)
}

pub struct PrivateVault<'a, S: TaskStore + ?Sized> {
    store: &'a S,
    owner: String,
}

impl<'a, S: TaskStore + ?Sized> PrivateVault<'a, S> {
    pub fn new(store: &'a S, owner: &str) -> Self {
        Self {
            store,
            owner: owner.to_string(),
        }
    }

    pub fn is_pin_set(&self) -> Result<bool, VaultError> {
        Ok(self.store.pin_hash(&self.owner)?.is_some())
    }

    pub fn set_pin(&self, pin: &str) -> Result<(), VaultError> {
        validate_pin(pin)?;
        if self.is_pin_set()? {
            return Err(VaultError::PinAlreadySet);
        }
        self.store.set_pin_hash(&self.owner, &hash_pin(&self.owner, pin))?;
        tracing::info!(owner = %self.owner, "private PIN set");
        Ok(())
    }

    pub fn unlock(&self, pin: &str) -> Result<UnlockedVault<'a, S>, VaultError> {
        validate_pin(pin)?;
        let stored = self.store.pin_hash(&self.owner)?.ok_or(VaultError::PinNotSet)?;
        if stored != hash_pin(&self.owner, pin) {
            tracing::warn!(owner = %self.owner, "rejected private PIN");
            return Err(VaultError::InvalidPin);
        }
        Ok(UnlockedVault {
            store: self.store,
            owner: self.owner.clone(),
        })
    }
}

pub struct UnlockedVault<'a, S: TaskStore + ?Sized> {
    store: &'a S,
    owner: String,
}

impl<S: TaskStore + ?Sized> UnlockedVault<'_, S> {
    pub fn list(&self) -> Result<Vec<Task>, VaultError> {
        Ok(self.store.list(Collection::Private, &self.owner)?)
    }

    /// Private tasks always carry a usable timestamp.
    pub fn create(
        &self,
        title: &str,
        description: Option<String>,
        datetime: &str,
    ) -> Result<Task, VaultError> {
        let task = NewTask::new(title, Default::default())?
            .with_datetime(datetime)?
            .with_description(description);
        Ok(self.store.create(Collection::Private, &self.owner, task)?)
    }

    pub fn toggle_complete(&self, id_prefix: &str) -> Result<Task, VaultError> {
        let tasks = self.list()?;
        let task = find_by_prefix(&tasks, id_prefix)?;
        let patch = TaskPatch::completed(!task.completed);
        Ok(self.store.update(Collection::Private, &task.id, &patch)?)
    }

    pub fn delete(&self, id_prefix: &str) -> Result<Task, VaultError> {
        let tasks = self.list()?;
        let task = find_by_prefix(&tasks, id_prefix)?.clone();
        self.store.delete(Collection::Private, &task.id)?;
        Ok(task)
    }
}
