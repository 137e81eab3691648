use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct Todo {
    pub id: i64,
    pub user: String,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated write payload: the fields a caller is allowed to set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub is_completed: bool,
}
