use crate::auth::Identity;
use crate::models::{Category, NewTask, StorageError, Task, TaskError, TaskPatch};
use crate::stats::{ActivityHistogram, TaskStats};
use crate::storage::{Collection, TaskStore};
use crate::templates;
use crate::view::{annotate_original_index, derive, Screen, ViewSelection};
use chrono::NaiveDate;
use thiserror::Error;

/// Failure to pick one task out of a list by id or id prefix.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("No task matches id '{0}'")]
    NotFound(String),
    #[error("Id '{0}' matches {1} tasks, use more characters")]
    Ambiguous(String, usize),
}

/// Finds the task whose id equals `prefix`, or the only one starting with it.
pub fn find_by_prefix<'t>(tasks: &'t [Task], prefix: &str) -> Result<&'t Task, LookupError> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return Err(LookupError::NotFound(prefix.to_string()));
    }
    if let Some(task) = tasks.iter().find(|t| t.id == prefix) {
        return Ok(task);
    }
    let mut matches = tasks.iter().filter(|t| t.id.starts_with(prefix));
    match (matches.next(), matches.count()) {
        (None, _) => Err(LookupError::NotFound(prefix.to_string())),
        (Some(task), 0) => Ok(task),
        (Some(_), rest) => Err(LookupError::Ambiguous(prefix.to_string(), rest + 1)),
    }
}

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("No template #{number} for {category} (choose 1-{available})")]
    InvalidTemplate {
        category: Category,
        number: usize,
        available: usize,
    },
    #[error("Nothing to change")]
    EmptyPatch,
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The signed-in owner's view of the regular task collection.
pub struct TaskManager<'a, S: TaskStore + ?Sized> {
    store: &'a S,
    owner: String,
}

impl<'a, S: TaskStore + ?Sized> TaskManager<'a, S> {
    pub fn new(store: &'a S, identity: &Identity) -> Self {
        Self {
            store,
            owner: identity.owner_id.clone(),
        }
    }

    /// A fresh snapshot with `original_index` set from the store's order.
    pub fn fetch(&self) -> Result<Vec<Task>, ManagerError> {
        let tasks = self.store.list(Collection::Tasks, &self.owner)?;
        Ok(annotate_original_index(tasks))
    }

    pub fn view(&self, selection: &ViewSelection, screen: Screen) -> Result<Vec<Task>, ManagerError> {
        Ok(derive(&self.fetch()?, selection, screen))
    }

    pub fn add(&self, task: NewTask) -> Result<Task, ManagerError> {
        Ok(self.store.create(Collection::Tasks, &self.owner, task)?)
    }

    /// Adds the `number`th (1-based) template of `category`, stamped now.
    pub fn add_from_template(&self, category: Category, number: usize) -> Result<Task, ManagerError> {
        let title = templates::template(category, number).ok_or(ManagerError::InvalidTemplate {
            category,
            number,
            available: templates::templates_for(category).len(),
        })?;
        self.add(NewTask::new(title, category)?)
    }

    pub fn get(&self, id_prefix: &str) -> Result<Task, ManagerError> {
        let tasks = self.fetch()?;
        Ok(find_by_prefix(&tasks, id_prefix)?.clone())
    }

    pub fn edit(&self, id_prefix: &str, patch: &TaskPatch) -> Result<Task, ManagerError> {
        if patch.is_empty() {
            return Err(ManagerError::EmptyPatch);
        }
        let task = self.get(id_prefix)?;
        Ok(self.store.update(Collection::Tasks, &task.id, patch)?)
    }

    pub fn set_completed(&self, id_prefix: &str, completed: bool) -> Result<Task, ManagerError> {
        self.edit(id_prefix, &TaskPatch::completed(completed))
    }

    pub fn toggle_completed(&self, id_prefix: &str) -> Result<Task, ManagerError> {
        let task = self.get(id_prefix)?;
        self.edit(&task.id, &TaskPatch::completed(!task.completed))
    }

    pub fn set_starred(&self, id_prefix: &str, starred: bool) -> Result<Task, ManagerError> {
        self.edit(id_prefix, &TaskPatch::starred(starred))
    }

    pub fn delete(&self, id_prefix: &str) -> Result<Task, ManagerError> {
        let task = self.get(id_prefix)?;
        self.store.delete(Collection::Tasks, &task.id)?;
        Ok(task)
    }

    pub fn stats(&self) -> Result<TaskStats, ManagerError> {
        Ok(TaskStats::from_tasks(&self.fetch()?))
    }

    pub fn activity(&self, today: NaiveDate) -> Result<ActivityHistogram, ManagerError> {
        Ok(ActivityHistogram::from_tasks(&self.fetch()?, today))
    }
}
