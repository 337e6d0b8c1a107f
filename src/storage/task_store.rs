use super::{Storage, StorageError};
use crate::models::{NewTask, PinRecord, StorageData, Task, TaskPatch};
use uuid::Uuid;

/// Which task set an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Tasks,
    /// The PIN-gated set. Only reachable through [`crate::private::PrivateVault`].
    Private,
}

impl Collection {
    fn tasks(self, data: &StorageData) -> &Vec<Task> {
        match self {
            Collection::Tasks => &data.tasks,
            Collection::Private => &data.private_tasks,
        }
    }

    fn tasks_mut(self, data: &mut StorageData) -> &mut Vec<Task> {
        match self {
            Collection::Tasks => &mut data.tasks,
            Collection::Private => &mut data.private_tasks,
        }
    }
}

/// The task store the rest of the crate talks to. Records come back in the
/// order they were stored; ids are assigned here and never change.
pub trait TaskStore {
    fn list(&self, collection: Collection, owner: &str) -> Result<Vec<Task>, StorageError>;
    fn create(&self, collection: Collection, owner: &str, task: NewTask)
        -> Result<Task, StorageError>;
    fn update(&self, collection: Collection, id: &str, patch: &TaskPatch)
        -> Result<Task, StorageError>;
    fn delete(&self, collection: Collection, id: &str) -> Result<(), StorageError>;

    fn pin_hash(&self, owner: &str) -> Result<Option<String>, StorageError>;
    fn set_pin_hash(&self, owner: &str, pin_hash: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> TaskStore for S {
    fn list(&self, collection: Collection, owner: &str) -> Result<Vec<Task>, StorageError> {
        let data = self.load()?;
        Ok(collection
            .tasks(&data)
            .iter()
            .filter(|t| t.owner == owner)
            .cloned()
            .collect())
    }

    fn create(
        &self,
        collection: Collection,
        owner: &str,
        task: NewTask,
    ) -> Result<Task, StorageError> {
        let mut data = self.load()?;
        let task = task.into_task(Uuid::new_v4().to_string(), owner);
        match collection {
            Collection::Tasks => data.tasks.push(task.clone()),
            // Newest private entries are listed first.
            Collection::Private => data.private_tasks.insert(0, task.clone()),
        }
        self.save(&data)?;
        tracing::info!(id = %task.id, ?collection, "created task");
        Ok(task)
    }

    fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: &TaskPatch,
    ) -> Result<Task, StorageError> {
        let mut data = self.load()?;
        let task = collection
            .tasks_mut(&mut data)
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StorageError::TaskNotFound(id.to_string()))?;
        patch.apply(task)?;
        let updated = task.clone();
        self.save(&data)?;
        tracing::info!(id, ?collection, "updated task");
        Ok(updated)
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<(), StorageError> {
        let mut data = self.load()?;
        let tasks = collection.tasks_mut(&mut data);
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(StorageError::TaskNotFound(id.to_string()));
        }
        self.save(&data)?;
        tracing::info!(id, ?collection, "deleted task");
        Ok(())
    }

    fn pin_hash(&self, owner: &str) -> Result<Option<String>, StorageError> {
        let data = self.load()?;
        Ok(data
            .pins
            .into_iter()
            .find(|p| p.owner == owner)
            .map(|p| p.pin_hash))
    }

    fn set_pin_hash(&self, owner: &str, pin_hash: &str) -> Result<(), StorageError> {
        let mut data = self.load()?;
        match data.pins.iter_mut().find(|p| p.owner == owner) {
            Some(record) => record.pin_hash = pin_hash.to_string(),
            None => data.pins.push(PinRecord {
                owner: owner.to_string(),
                pin_hash: pin_hash.to_string(),
            }),
        }
        self.save(&data)
    }
}
