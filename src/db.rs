use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, Row};
use tracing::info;

use crate::error::AppError;
use crate::models::TodoItem;

/// Schema steps, applied in order. The index + 1 of the last applied step is
/// kept in `PRAGMA user_version`.
const MIGRATIONS: &[&str] = &["
    CREATE TABLE IF NOT EXISTS todo_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL CHECK (length(title) BETWEEN 1 AND 100),
        description TEXT CHECK (description IS NULL OR length(description) <= 500),
        isCompleted INTEGER NOT NULL DEFAULT 0
    );
    "];

const SELECT_COLUMNS: &str = "SELECT id, title, description, isCompleted FROM todo_items";

/// Handle to the `todo_items` table. Cheap to clone; every clone shares the
/// same connection.
#[derive(Clone)]
pub struct TodoContext {
    conn: Arc<Mutex<Connection>>,
}

impl TodoContext {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Opens the database at `path` without touching the schema.
    pub fn open(path: &str) -> Result<Self, AppError> {
        Ok(Self::new(Connection::open(path)?))
    }

    /// A fresh, migrated in-memory database.
    pub fn open_in_memory() -> Result<Self, AppError> {
        let ctx = Self::new(Connection::open_in_memory()?);
        ctx.migrate()?;
        Ok(ctx)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.conn
            .lock()
            .map_err(|_| AppError::Database("connection lock poisoned".to_string()))
    }

    /// Brings the schema up to date. Safe to call on every startup.
    pub fn migrate(&self) -> Result<(), AppError> {
        let mut conn = self.conn()?;
        let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        for (idx, step) in MIGRATIONS.iter().enumerate().skip(current as usize) {
            let version = idx as i64 + 1;
            let tx = conn.transaction()?;
            tx.execute_batch(step)?;
            tx.pragma_update(None, "user_version", version)?;
            tx.commit()?;
            info!(version, "Applied schema migration");
        }

        Ok(())
    }

    #[cfg(test)]
    fn schema_version(&self) -> Result<i64, AppError> {
        let conn = self.conn()?;
        Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
    }

    pub fn list_all(&self) -> Result<Vec<TodoItem>, AppError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id ASC"))?;
        let items = stmt
            .query_map([], item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<TodoItem>, AppError> {
        let conn = self.conn()?;
        find_internal(&conn, id)
    }

    /// Stores `item` under a newly assigned id; the incoming `id` is ignored.
    pub fn insert(&self, item: &TodoItem) -> Result<TodoItem, AppError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO todo_items (title, description, isCompleted) VALUES (?1, ?2, ?3)",
            (&item.title, &item.description, item.is_completed),
        )?;
        let id = tx.last_insert_rowid();
        let stored = find_internal(&tx, id)?
            .ok_or_else(|| AppError::Database(format!("inserted row {id} vanished")))?;

        tx.commit()?;
        Ok(stored)
    }

    /// Replaces title, description and completion of the row with `item.id`.
    /// Returns `false` when there is no such row.
    pub fn update(&self, item: &TodoItem) -> Result<bool, AppError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let Some(mut existing) = find_internal(&tx, item.id)? else {
            return Ok(false);
        };
        existing.title.clone_from(&item.title);
        existing.description.clone_from(&item.description);
        existing.is_completed = item.is_completed;

        tx.execute(
            "UPDATE todo_items SET title = ?1, description = ?2, isCompleted = ?3 WHERE id = ?4",
            (
                &existing.title,
                &existing.description,
                existing.is_completed,
                existing.id,
            ),
        )?;

        tx.commit()?;
        Ok(true)
    }

    /// Returns `false` when there is no row with `id`.
    pub fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let rows = tx.execute("DELETE FROM todo_items WHERE id = ?1", [id])?;
        tx.commit()?;
        Ok(rows > 0)
    }
}

fn find_internal(conn: &Connection, id: i64) -> Result<Option<TodoItem>, AppError> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;
    Ok(stmt.query_row([id], item_from_row).optional()?)
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<TodoItem> {
    Ok(TodoItem {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        is_completed: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, description: Option<&str>, is_completed: bool) -> TodoItem {
        TodoItem {
            id: 0,
            title: title.to_string(),
            description: description.map(str::to_string),
            is_completed,
        }
    }

    fn seeded() -> TodoContext {
        let ctx = TodoContext::open_in_memory().unwrap();
        ctx.insert(&item("Task1", Some("Desc1"), false)).unwrap();
        ctx.insert(&item("Task2", Some("Desc2"), true)).unwrap();
        ctx
    }

    #[test]
    fn list_returns_all_rows_in_id_order() {
        let ctx = seeded();
        let items = ctx.list_all().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Task1");
        assert!(!items[0].is_completed);
        assert_eq!(items[1].title, "Task2");
        assert!(items[1].is_completed);
        assert!(items[0].id < items[1].id);
    }

    #[test]
    fn insert_ignores_client_id() {
        let ctx = TodoContext::open_in_memory().unwrap();
        let mut candidate = item("x", None, false);
        candidate.id = 42;
        let stored = ctx.insert(&candidate).unwrap();
        assert_eq!(stored.id, 1);
        assert_eq!(ctx.find_by_id(1).unwrap(), Some(stored));
        assert_eq!(ctx.find_by_id(42).unwrap(), None);
    }

    #[test]
    fn find_missing_is_none() {
        let ctx = seeded();
        assert_eq!(ctx.find_by_id(999).unwrap(), None);
    }

    #[test]
    fn update_replaces_all_fields() {
        let ctx = seeded();
        let mut first = ctx.list_all().unwrap().remove(0);
        first.title = "UpdatedTitle".to_string();
        first.description = None;
        first.is_completed = true;

        assert!(ctx.update(&first).unwrap());
        assert_eq!(ctx.find_by_id(first.id).unwrap(), Some(first));
    }

    #[test]
    fn update_missing_row_is_not_found() {
        let ctx = seeded();
        let mut ghost = item("ghost", None, false);
        ghost.id = 999;
        assert!(!ctx.update(&ghost).unwrap());
        assert_eq!(ctx.list_all().unwrap().len(), 2);
    }

    #[test]
    fn delete_twice() {
        let ctx = seeded();
        let id = ctx.list_all().unwrap()[0].id;
        assert!(ctx.delete(id).unwrap());
        assert!(!ctx.delete(id).unwrap());
        assert_eq!(ctx.list_all().unwrap().len(), 1);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let ctx = seeded();
        let last = ctx.list_all().unwrap()[1].id;
        assert!(ctx.delete(last).unwrap());
        let next = ctx.insert(&item("Task3", None, false)).unwrap();
        assert!(next.id > last);
    }

    #[test]
    fn storage_rejects_out_of_range_fields() {
        let ctx = TodoContext::open_in_memory().unwrap();
        assert!(matches!(
            ctx.insert(&item("", None, false)),
            Err(AppError::Database(_))
        ));
        assert!(matches!(
            ctx.insert(&item(&"a".repeat(101), None, false)),
            Err(AppError::Database(_))
        ));
        assert!(matches!(
            ctx.insert(&item("ok", Some(&"d".repeat(501)), false)),
            Err(AppError::Database(_))
        ));
        assert!(ctx.list_all().unwrap().is_empty());
    }

    #[test]
    fn migrate_is_idempotent_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todoitems.db");
        let path = path.to_str().unwrap();

        let ctx = TodoContext::open(path).unwrap();
        assert_eq!(ctx.schema_version().unwrap(), 0);
        ctx.migrate().unwrap();
        ctx.insert(&item("persisted", None, true)).unwrap();
        drop(ctx);

        let ctx = TodoContext::open(path).unwrap();
        ctx.migrate().unwrap();
        assert_eq!(ctx.schema_version().unwrap(), MIGRATIONS.len() as i64);
        let items = ctx.list_all().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "persisted");
    }
}
