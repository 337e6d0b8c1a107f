//! Schema migrations for the SQLite backend.
//!
//! Version 1 is the base schema created by [`initialize_schema`]. Every later
//! change is an entry in [`MIGRATIONS`] with forward (`up`) and backward
//! (`down`) SQL. The current version lives in the single-row
//! `schema_version` table.
//!
//! To add a migration, append an entry with the next version number:
//!
//! ```text
//! Migration {
//!     version: 4,
//!     up: "ALTER TABLE tasks ADD COLUMN repeat TEXT;",
//!     down: "ALTER TABLE tasks DROP COLUMN repeat;",
//! },
//! ```
//!
//! Pending migrations are applied in order inside one transaction, so a
//! failing step leaves the database at its previous version.

use super::StorageError;
use rusqlite::{Connection, OptionalExtension, Transaction};

/// Represents a database migration with up and down SQL statements
#[derive(Debug)]
pub struct Migration {
    /// The version number of this migration
    pub version: i32,
    /// SQL statements to apply this migration
    pub up: &'static str,
    /// SQL statements to reverse this migration
    pub down: &'static str,
}

pub const BASE_VERSION: i32 = 1;

const BASE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    owner TEXT NOT NULL,
    position INTEGER NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    category TEXT NOT NULL,
    datetime TEXT,
    completed INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS tasks_owner ON tasks (owner);
"#;

/// List of all database migrations in order of application
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 2,
        up: "ALTER TABLE tasks ADD COLUMN starred INTEGER NOT NULL DEFAULT 0;",
        down: "ALTER TABLE tasks DROP COLUMN starred;",
    },
    Migration {
        version: 3,
        up: r#"
            CREATE TABLE private_tasks (
                id TEXT PRIMARY KEY,
                owner TEXT NOT NULL,
                position INTEGER NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                category TEXT NOT NULL,
                datetime TEXT,
                completed INTEGER NOT NULL DEFAULT 0,
                starred INTEGER NOT NULL DEFAULT 0
            );
            CREATE TABLE private_pins (
                owner TEXT PRIMARY KEY,
                pin_hash TEXT NOT NULL
            );
        "#,
        down: r#"
            DROP TABLE private_pins;
            DROP TABLE private_tasks;
        "#,
    },
];

pub fn latest_version() -> i32 {
    MIGRATIONS.last().map_or(BASE_VERSION, |m| m.version)
}

/// Creates the version table and the base schema on a fresh database.
pub fn initialize_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
        [],
    )
    .map_err(|e| StorageError::Storage(format!("Failed to create schema_version table: {}", e)))?;

    let existing: Option<i32> = conn
        .query_row("SELECT version FROM schema_version", [], |row| row.get(0))
        .optional()?;

    if existing.is_none() {
        conn.execute_batch(BASE_SCHEMA)
            .map_err(|e| StorageError::Storage(format!("Failed to create base schema: {}", e)))?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [BASE_VERSION],
        )?;
        tracing::debug!(version = BASE_VERSION, "initialized sqlite schema");
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_current_version(conn: &Connection) -> Result<i32, StorageError> {
    let version: i32 = conn
        .query_row("SELECT version FROM schema_version", [], |row| row.get(0))
        .map_err(|e| StorageError::Storage(format!("Failed to get schema version: {}", e)))?;
    Ok(version)
}

/// Apply any pending migrations to the database
pub fn apply_migrations(conn: &mut Connection) -> Result<(), StorageError> {
    let current_version = get_current_version(conn)?;
    let latest_version = latest_version();

    if current_version < latest_version {
        let tx = conn
            .transaction()
            .map_err(|e| StorageError::Storage(format!("Failed to start transaction: {}", e)))?;

        for migration in MIGRATIONS.iter().filter(|m| m.version > current_version) {
            apply_migration(&tx, migration)?;
        }

        tx.commit()
            .map_err(|e| StorageError::Storage(format!("Failed to commit transaction: {}", e)))?;
        tracing::info!(from = current_version, to = latest_version, "migrated sqlite schema");
    }

    Ok(())
}

/// Apply a single migration
fn apply_migration(tx: &Transaction, migration: &Migration) -> Result<(), StorageError> {
    tx.execute_batch(migration.up).map_err(|e| {
        StorageError::Storage(format!(
            "Failed to apply migration {}: {}",
            migration.version, e
        ))
    })?;

    tx.execute(
        "UPDATE schema_version SET version = ?1",
        [migration.version],
    )
    .map_err(|e| {
        StorageError::Storage(format!(
            "Failed to update schema version to {}: {}",
            migration.version, e
        ))
    })?;

    Ok(())
}

/// Rollback migrations down to `target_version`, never below the base schema.
pub fn rollback_migrations(conn: &mut Connection, target_version: i32) -> Result<(), StorageError> {
    if target_version < BASE_VERSION {
        return Err(StorageError::Storage(format!(
            "Cannot roll back below the base schema version {}",
            BASE_VERSION
        )));
    }

    let current_version = get_current_version(conn)?;
    if current_version > target_version {
        let tx = conn
            .transaction()
            .map_err(|e| StorageError::Storage(format!("Failed to start transaction: {}", e)))?;

        for migration in MIGRATIONS
            .iter()
            .filter(|m| m.version > target_version && m.version <= current_version)
            .rev()
        {
            rollback_migration(&tx, migration)?;
        }

        tx.commit()
            .map_err(|e| StorageError::Storage(format!("Failed to commit transaction: {}", e)))?;
    }

    Ok(())
}

fn rollback_migration(tx: &Transaction, migration: &Migration) -> Result<(), StorageError> {
    tx.execute_batch(migration.down).map_err(|e| {
        StorageError::Storage(format!(
            "Failed to rollback migration {}: {}",
            migration.version, e
        ))
    })?;

    tx.execute(
        "UPDATE schema_version SET version = ?1",
        [migration.version - 1],
    )
    .map_err(|e| {
        StorageError::Storage(format!(
            "Failed to update schema version to {}: {}",
            migration.version - 1,
            e
        ))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get::<_, i64>(0),
        )
        .unwrap()
            > 0
    }

    fn has_column(conn: &Connection, table: &str, column: &str) -> bool {
        let mut stmt = conn
            .prepare(&format!("SELECT name FROM pragma_table_info('{}')", table))
            .unwrap();
        let names: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        names.iter().any(|n| n == column)
    }

    #[test]
    fn test_migration_system() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut conn = Connection::open(temp_file.path()).unwrap();

        initialize_schema(&conn).unwrap();
        assert_eq!(get_current_version(&conn).unwrap(), BASE_VERSION);
        assert!(!has_column(&conn, "tasks", "starred"));

        apply_migrations(&mut conn).unwrap();
        assert_eq!(get_current_version(&conn).unwrap(), latest_version());
        assert!(has_column(&conn, "tasks", "starred"));
        assert!(table_exists(&conn, "private_tasks"));
        assert!(table_exists(&conn, "private_pins"));

        // Applying again is a no-op
        apply_migrations(&mut conn).unwrap();
        assert_eq!(get_current_version(&conn).unwrap(), latest_version());

        rollback_migrations(&mut conn, 2).unwrap();
        assert_eq!(get_current_version(&conn).unwrap(), 2);
        assert!(!table_exists(&conn, "private_tasks"));
        assert!(has_column(&conn, "tasks", "starred"));

        rollback_migrations(&mut conn, BASE_VERSION).unwrap();
        assert_eq!(get_current_version(&conn).unwrap(), BASE_VERSION);
        assert!(!has_column(&conn, "tasks", "starred"));

        assert!(rollback_migrations(&mut conn, 0).is_err());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        initialize_schema(&conn).unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_migrations_are_ordered() {
        let versions: Vec<i32> = MIGRATIONS.iter().map(|m| m.version).collect();
        let mut sorted = versions.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(versions, sorted);
        assert!(versions.iter().all(|v| *v > BASE_VERSION));
    }
}
