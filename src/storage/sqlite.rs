use super::{migrations, Storage, StorageError};
use crate::models::{Category, PinRecord, StorageData, Task};
use chrono::Utc;
use rusqlite::{params, Connection, Row, Transaction};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const TASK_COLUMNS: &str =
    "id, owner, title, description, category, datetime, completed, starred";

pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_string_lossy();
        let path = PathBuf::from(shellexpand::tilde(&path).to_string());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)
            .map_err(|e| StorageError::Storage(format!("Failed to open database: {}", e)))?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(mut conn: Connection) -> Result<Self, StorageError> {
        migrations::initialize_schema(&conn)?;
        migrations::apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn get_connection(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Storage(format!("Failed to lock connection: {}", e)))
    }

    fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
        Ok(Task {
            id: row.get(0)?,
            owner: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            category: Category::from_store(&row.get::<_, String>(4)?),
            datetime: row.get(5)?,
            completed: row.get(6)?,
            starred: row.get(7)?,
            original_index: 0,
        })
    }

    fn load_tasks(conn: &Connection, table: &str) -> Result<Vec<Task>, StorageError> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM {} ORDER BY position",
                TASK_COLUMNS, table
            ))
            .map_err(|e| StorageError::Storage(format!("Failed to prepare {} query: {}", table, e)))?;

        let rows = stmt
            .query_map([], Self::task_from_row)
            .map_err(|e| StorageError::Storage(format!("Failed to query {}: {}", table, e)))?;

        let mut tasks = Vec::new();
        for task in rows {
            tasks.push(
                task.map_err(|e| StorageError::Storage(format!("Failed to read task: {}", e)))?,
            );
        }
        Ok(tasks)
    }

    fn load_pins(conn: &Connection) -> Result<Vec<PinRecord>, StorageError> {
        let mut stmt = conn
            .prepare("SELECT owner, pin_hash FROM private_pins ORDER BY owner")
            .map_err(|e| StorageError::Storage(format!("Failed to prepare pins query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(PinRecord {
                    owner: row.get(0)?,
                    pin_hash: row.get(1)?,
                })
            })
            .map_err(|e| StorageError::Storage(format!("Failed to query pins: {}", e)))?;

        let mut pins = Vec::new();
        for pin in rows {
            pins.push(pin?);
        }
        Ok(pins)
    }

    fn insert_tasks(tx: &Transaction, table: &str, tasks: &[Task]) -> Result<(), StorageError> {
        let sql = format!(
            "INSERT INTO {} (position, {}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            table, TASK_COLUMNS
        );
        let mut stmt = tx.prepare(&sql)?;
        for (position, task) in tasks.iter().enumerate() {
            stmt.execute(params![
                position as i64,
                task.id,
                task.owner,
                task.title,
                task.description,
                task.category.as_str(),
                task.datetime,
                task.completed,
                task.starred,
            ])?;
        }
        Ok(())
    }
}

impl Storage for SqliteStorage {
    fn save(&self, data: &StorageData) -> Result<(), StorageError> {
        data.validate()?;

        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;

        // Clear existing data
        tx.execute("DELETE FROM tasks", [])?;
        tx.execute("DELETE FROM private_tasks", [])?;
        tx.execute("DELETE FROM private_pins", [])?;

        Self::insert_tasks(&tx, "tasks", &data.tasks)?;
        Self::insert_tasks(&tx, "private_tasks", &data.private_tasks)?;

        for pin in &data.pins {
            tx.execute(
                "INSERT INTO private_pins (owner, pin_hash) VALUES (?1, ?2)",
                params![pin.owner, pin.pin_hash],
            )?;
        }

        tx.commit()?;
        tracing::debug!(tasks = data.tasks.len(), "saved sqlite storage");
        Ok(())
    }

    fn load(&self) -> Result<StorageData, StorageError> {
        let conn = self.get_connection()?;

        let tasks = Self::load_tasks(&conn, "tasks")?;
        let private_tasks = Self::load_tasks(&conn, "private_tasks")?;
        let pins = Self::load_pins(&conn)?;

        Ok(StorageData {
            version: migrations::get_current_version(&conn)? as u32,
            tasks,
            private_tasks,
            pins,
            last_sync: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTask;

    fn task(id: &str, title: &str, category: Category) -> Task {
        NewTask::new(title, category)
            .unwrap()
            .with_datetime("2024-03-05T09:30")
            .unwrap()
            .into_task(id.to_string(), "me@example.com")
    }

    #[test]
    fn test_sqlite_storage_on_disk() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage_path = temp_dir.path().join("tasks.db");
        let storage = SqliteStorage::new(&storage_path).unwrap();
        assert!(storage.load().unwrap().tasks.is_empty());
        assert!(storage_path.exists());
    }

    #[test]
    fn test_sqlite_round_trip_keeps_order() {
        let storage = SqliteStorage::in_memory().unwrap();
        let mut data = StorageData::new();
        data.tasks.push(task("z", "Zulu", Category::Work));
        data.tasks.push(task("a", "Alpha", Category::Birthdays));
        data.tasks[1].starred = true;
        data.tasks[1].description = Some("cake".to_string());
        data.private_tasks.push(task("p", "Secret", Category::Personal));
        data.pins.push(PinRecord {
            owner: "me@example.com".to_string(),
            pin_hash: "deadbeef".to_string(),
        });

        storage.save(&data).unwrap();
        let loaded = storage.load().unwrap();
        assert_eq!(loaded.tasks, data.tasks);
        assert_eq!(loaded.private_tasks, data.private_tasks);
        assert_eq!(loaded.pins, data.pins);
        assert_eq!(loaded.version as i32, migrations::latest_version());
    }

    #[test]
    fn test_sqlite_save_replaces_previous_snapshot() {
        let storage = SqliteStorage::in_memory().unwrap();
        let mut data = StorageData::new();
        data.tasks.push(task("1", "One", Category::Work));
        data.tasks.push(task("2", "Two", Category::Work));
        storage.save(&data).unwrap();

        data.tasks.remove(0);
        storage.save(&data).unwrap();
        let loaded = storage.load().unwrap();
        assert_eq!(loaded.tasks.len(), 1);
        assert_eq!(loaded.tasks[0].title, "Two");
    }

    #[test]
    fn test_unknown_category_in_database_maps_to_default() {
        let storage = SqliteStorage::in_memory().unwrap();
        {
            let conn = storage.get_connection().unwrap();
            conn.execute(
                "INSERT INTO tasks (id, owner, position, title, category) VALUES ('x', 'me', 0, 'Odd', 'chores')",
                [],
            )
            .unwrap();
        }
        let loaded = storage.load().unwrap();
        assert_eq!(loaded.tasks[0].category, Category::Personal);
        assert_eq!(loaded.tasks[0].datetime, None);
    }
}
