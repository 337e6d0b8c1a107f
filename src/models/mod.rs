use crate::datetime;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub owner: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: Category,
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub starred: bool,
    /// Position in the batch this task was fetched in. Never persisted.
    #[serde(skip)]
    pub original_index: usize,
}

impl Task {
    /// The task's timestamp in canonical form, normalizing legacy values.
    pub fn normalized_datetime(&self) -> Option<String> {
        datetime::normalize(self.datetime.as_deref())
    }

    /// The parsed timestamp, or `None` when absent or unusable.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        let raw = self.datetime.as_deref()?;
        datetime::parse_canonical(raw)
            .or_else(|| datetime::normalize(Some(raw)).and_then(|v| datetime::parse_canonical(&v)))
    }
}

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task title cannot be empty")]
    EmptyTitle,
    #[error("Invalid category: {0} (expected one of: work, personal, wishlist, birthdays, special)")]
    InvalidCategory(String),
    #[error("Invalid date & time: {0}")]
    InvalidDateTime(String),
}

/// The closed set of task categories.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Default)]
pub enum Category {
    Work,
    #[default]
    Personal,
    Wishlist,
    Birthdays,
    Special,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Work,
        Category::Personal,
        Category::Wishlist,
        Category::Birthdays,
        Category::Special,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Wishlist => "wishlist",
            Category::Birthdays => "birthdays",
            Category::Special => "special",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Wishlist => "Wishlist",
            Category::Birthdays => "Birthdays",
            Category::Special => "Special Occasions",
        }
    }

    /// Reads a category coming back from a store. Unknown values fall back
    /// to the default category instead of failing the whole load.
    pub fn from_store(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!(category = value, "unknown stored category, using personal");
            Category::default()
        })
    }
}

impl FromStr for Category {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "work" => Ok(Category::Work),
            "personal" => Ok(Category::Personal),
            "wishlist" => Ok(Category::Wishlist),
            "birthdays" => Ok(Category::Birthdays),
            "special" => Ok(Category::Special),
            _ => Err(TaskError::InvalidCategory(s.to_string())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Category::from_store(&raw))
    }
}

/// A validated request to create a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub datetime: String,
}

impl NewTask {
    /// Builds a task stamped with the current local time.
    pub fn new(title: &str, category: Category) -> Result<Self, TaskError> {
        Ok(Self {
            title: validate_title(title)?,
            description: None,
            category,
            datetime: datetime::now_canonical(),
        })
    }

    /// Replaces the timestamp with the normalized form of `raw`.
    pub fn with_datetime(mut self, raw: &str) -> Result<Self, TaskError> {
        self.datetime = datetime::normalize(Some(raw))
            .ok_or_else(|| TaskError::InvalidDateTime(raw.to_string()))?;
        Ok(self)
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.trim().is_empty());
        self
    }

    pub fn into_task(self, id: String, owner: &str) -> Task {
        Task {
            id,
            owner: owner.to_string(),
            title: self.title,
            description: self.description,
            category: self.category,
            datetime: Some(self.datetime),
            completed: false,
            starred: false,
            original_index: 0,
        }
    }
}

/// Partial update of a stored task. `None` leaves a field untouched; for the
/// nullable fields `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<Category>,
    pub datetime: Option<Option<String>>,
    pub completed: Option<bool>,
    pub starred: Option<bool>,
}

impl TaskPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Default::default()
        }
    }

    pub fn starred(starred: bool) -> Self {
        Self {
            starred: Some(starred),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the patch, validating before anything is written so a failed
    /// patch leaves the task unchanged.
    pub fn apply(&self, task: &mut Task) -> Result<(), TaskError> {
        let title = self.title.as_deref().map(validate_title).transpose()?;
        let datetime = match &self.datetime {
            Some(Some(raw)) => Some(Some(
                datetime::normalize(Some(raw))
                    .ok_or_else(|| TaskError::InvalidDateTime(raw.clone()))?,
            )),
            Some(None) => Some(None),
            None => None,
        };

        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(datetime) = datetime {
            task.datetime = datetime;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(starred) = self.starred {
            task.starred = starred;
        }
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<String, TaskError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

/// A per-owner PIN digest guarding the private collection.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PinRecord {
    pub owner: String,
    pub pin_hash: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StorageData {
    pub version: u32, // Schema version for future migrations
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub private_tasks: Vec<Task>,
    #[serde(default)]
    pub pins: Vec<PinRecord>,
    pub last_sync: DateTime<Utc>,
}

impl Default for StorageData {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageData {
    pub fn new() -> Self {
        Self {
            version: 1,
            tasks: Vec::new(),
            private_tasks: Vec::new(),
            pins: Vec::new(),
            last_sync: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), StorageError> {
        let mut ids = HashSet::new();
        for task in self.tasks.iter().chain(&self.private_tasks) {
            if task.title.trim().is_empty() {
                return Err(StorageError::InvalidData(format!(
                    "task {} has an empty title",
                    task.id
                )));
            }
            if !ids.insert(task.id.as_str()) {
                return Err(StorageError::DuplicateTask(task.id.clone()));
            }
        }

        let mut owners = HashSet::new();
        for pin in &self.pins {
            if !owners.insert(pin.owner.as_str()) {
                return Err(StorageError::InvalidData(format!(
                    "more than one PIN stored for {}",
                    pin.owner
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Task not found: {0}")]
    TaskNotFound(String),
    #[error("Duplicate task id: {0}")]
    DuplicateTask(String),
    #[error(transparent)]
    Task(#[from] TaskError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        NewTask::new("Buy milk", Category::Personal)
            .unwrap()
            .with_datetime("2024-03-05T09:30")
            .unwrap()
            .into_task("t-1".to_string(), "me@example.com")
    }

    #[test]
    fn test_new_task_trims_and_rejects_empty_title() {
        let task = NewTask::new("  Buy milk  ", Category::Work).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.category, Category::Work);
        assert!(datetime::parse_canonical(&task.datetime).is_some());

        assert!(matches!(
            NewTask::new("   ", Category::Work),
            Err(TaskError::EmptyTitle)
        ));
    }

    #[test]
    fn test_new_task_rejects_unusable_datetime() {
        let result = NewTask::new("Call mom", Category::Personal)
            .unwrap()
            .with_datetime("tomorrow-ish");
        assert!(matches!(result, Err(TaskError::InvalidDateTime(_))));
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Work".parse::<Category>().unwrap(), Category::Work);
        assert_eq!(" birthdays ".parse::<Category>().unwrap(), Category::Birthdays);
        assert!(matches!(
            "groceries".parse::<Category>(),
            Err(TaskError::InvalidCategory(_))
        ));
        assert_eq!(Category::from_store("groceries"), Category::Personal);
    }

    #[test]
    fn test_unknown_stored_category_maps_to_default() {
        let json = r#"{"id":"a","owner":"o","title":"x","category":"chores"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.category, Category::Personal);
        assert!(!task.completed);
        assert!(!task.starred);
        assert_eq!(task.datetime, None);
    }

    #[test]
    fn test_original_index_is_not_serialized() {
        let mut task = sample_task();
        task.original_index = 7;
        let json = serde_json::to_string(&task).unwrap();
        assert!(!json.contains("original_index"));
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back.original_index, 0);
    }

    #[test]
    fn test_patch_applies_fields() {
        let mut task = sample_task();
        let patch = TaskPatch {
            title: Some(" Buy oat milk ".to_string()),
            category: Some(Category::Wishlist),
            datetime: Some(Some("2024-03-06 10:15".to_string())),
            starred: Some(true),
            ..Default::default()
        };
        patch.apply(&mut task).unwrap();
        assert_eq!(task.title, "Buy oat milk");
        assert_eq!(task.category, Category::Wishlist);
        assert_eq!(task.datetime.as_deref(), Some("2024-03-06T10:15"));
        assert!(task.starred);
        assert!(!task.completed);
    }

    #[test]
    fn test_failed_patch_leaves_task_untouched() {
        let mut task = sample_task();
        let before = task.clone();
        let patch = TaskPatch {
            title: Some("New title".to_string()),
            datetime: Some(Some("garbage".to_string())),
            ..Default::default()
        };
        assert!(patch.apply(&mut task).is_err());
        assert_eq!(task, before);

        let empty_title = TaskPatch {
            title: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(matches!(empty_title.apply(&mut task), Err(TaskError::EmptyTitle)));
    }

    #[test]
    fn test_timestamp_of_task() {
        let mut task = sample_task();
        assert_eq!(
            task.timestamp().map(|t| datetime::format_canonical(&t)),
            Some("2024-03-05T09:30".to_string())
        );
        task.datetime = Some("2024-03-05T09:30:00".to_string());
        assert!(task.timestamp().is_some());
        task.datetime = Some("nope".to_string());
        assert!(task.timestamp().is_none());
        task.datetime = None;
        assert!(task.timestamp().is_none());
    }

    #[test]
    fn test_storage_data_validation() {
        let mut data = StorageData::new();
        data.tasks.push(sample_task());
        assert!(data.validate().is_ok());

        data.private_tasks.push(sample_task());
        assert!(matches!(data.validate(), Err(StorageError::DuplicateTask(_))));
    }
}
