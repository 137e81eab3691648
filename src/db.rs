use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use rusqlite::types::Value;

use crate::filters::TodoFilters;
use crate::models::{NewTodo, Todo};

const TODO_COLUMNS: &str = "id, user_id, title, description, is_completed, created_at, updated_at";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn connect<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("opening database at {}", path.as_ref().display()))?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> anyhow::Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                is_completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_todos_user ON todos (user_id);
            "#,
        )?;
        Ok(())
    }

    pub fn create_todo(&self, user: &str, input: &NewTodo) -> anyhow::Result<Todo> {
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO todos (user_id, title, description, is_completed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                user,
                input.title,
                input.description,
                input.is_completed,
                now.to_rfc3339()
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        Ok(Todo {
            id,
            user: user.to_string(),
            title: input.title.clone(),
            description: input.description.clone(),
            is_completed: input.is_completed,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn list_todos(&self, user: &str, filters: &TodoFilters) -> anyhow::Result<Vec<Todo>> {
        let mut sql = format!("SELECT {TODO_COLUMNS} FROM todos WHERE user_id = ?");
        let mut bind: Vec<Value> = vec![Value::Text(user.to_string())];
        let (clauses, filter_params) = filters.sql_clauses();
        for clause in clauses {
            sql.push_str(" AND ");
            sql.push_str(clause);
        }
        bind.extend(filter_params);
        sql.push_str(" ORDER BY id");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bind), row_to_todo)?;
        let mut todos = Vec::new();
        for todo in rows {
            todos.push(todo?);
        }
        Ok(todos)
    }

    pub fn get_todo(&self, user: &str, id: i64) -> anyhow::Result<Option<Todo>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE id = ?1 AND user_id = ?2"
        ))?;
        let todo = stmt.query_row(params![id, user], row_to_todo).optional()?;
        Ok(todo)
    }

    /// Full replacement of the mutable fields. Returns `None` when the row is
    /// absent or owned by someone else.
    pub fn update_todo(&self, user: &str, id: i64, input: &NewTodo) -> anyhow::Result<Option<Todo>> {
        let now = Utc::now();
        let updated = self.conn.execute(
            "UPDATE todos SET title = ?1, description = ?2, is_completed = ?3, updated_at = ?4
             WHERE id = ?5 AND user_id = ?6",
            params![
                input.title,
                input.description,
                input.is_completed,
                now.to_rfc3339(),
                id,
                user
            ],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        self.get_todo(user, id)
    }

    pub fn delete_todo(&self, user: &str, id: i64) -> anyhow::Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM todos WHERE id = ?1 AND user_id = ?2", params![id, user])?;
        Ok(deleted > 0)
    }
}

fn row_to_todo(row: &Row) -> rusqlite::Result<Todo> {
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;
    Ok(Todo {
        id: row.get(0)?,
        user: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        is_completed: row.get(4)?,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

fn parse_datetime(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
