//! Task CRUD and pagination statements.

use super::Database;
use crate::types::{Task, TaskFields};
use anyhow::Result;
use rusqlite::{Row, params};

/// Map a `tasks` row to a `Task`.
pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        due_date: row.get("due_date")?,
        status: row.get("status")?,
    })
}

impl Database {
    /// Insert a new task and return it with the store-assigned id.
    pub fn insert_task(&self, fields: &TaskFields) -> Result<Task> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT INTO tasks (title, description, due_date, status)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    fields.title,
                    fields.description,
                    fields.due_date,
                    fields.status
                ],
            )?;
            let id = tx.last_insert_rowid();

            tx.commit()?;

            Ok(Task {
                id,
                title: fields.title.clone(),
                description: fields.description.clone(),
                due_date: fields.due_date.clone(),
                status: fields.status.clone(),
            })
        })
    }

    /// Get a task by id.
    pub fn get_task(&self, id: i64) -> Result<Option<Task>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM tasks WHERE id = ?1")?;

            let result = stmt.query_row(params![id], parse_task_row);

            match result {
                Ok(task) => Ok(Some(task)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Replace all four mutable fields of an existing task in one statement.
    /// Returns the updated task, or `None` when no row matches the id.
    pub fn update_task(&self, id: i64, fields: &TaskFields) -> Result<Option<Task>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let changed = tx.execute(
                "UPDATE tasks SET title = ?1, description = ?2, due_date = ?3, status = ?4
                 WHERE id = ?5",
                params![
                    fields.title,
                    fields.description,
                    fields.due_date,
                    fields.status,
                    id
                ],
            )?;

            tx.commit()?;

            if changed == 0 {
                return Ok(None);
            }

            Ok(Some(Task {
                id,
                title: fields.title.clone(),
                description: fields.description.clone(),
                due_date: fields.due_date.clone(),
                status: fields.status.clone(),
            }))
        })
    }

    /// Delete a task by id. Returns `false` when no row matches.
    pub fn delete_task(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let changed = tx.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;

            tx.commit()?;

            Ok(changed > 0)
        })
    }

    /// Fetch one page of tasks in the store's natural retrieval order.
    pub fn list_page(&self, limit: i64, offset: i64) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM tasks LIMIT ?1 OFFSET ?2")?;

            let tasks = stmt
                .query_map(params![limit, offset], parse_task_row)?
                .filter_map(|r| r.ok())
                .collect();

            Ok(tasks)
        })
    }
}
