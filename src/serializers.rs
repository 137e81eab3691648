use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::{NewTodo, Todo};

/// Wire format for timestamps: ISO-8601 with microseconds and a `Z` suffix.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Read-side representation of a todo, as returned on every success path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoOut {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
    pub created_at: String,
    pub updated_at: String,
    pub user: String,
}

impl From<Todo> for TodoOut {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            description: todo.description,
            is_completed: todo.is_completed,
            created_at: format_timestamp(todo.created_at),
            updated_at: format_timestamp(todo.updated_at),
            user: todo.user,
        }
    }
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Raw create/update payload. Server-assigned fields are captured so their
/// presence can be rejected rather than silently ignored.
#[derive(Debug, Default, Deserialize)]
pub struct TodoWrite {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
    pub id: Option<serde_json::Value>,
    pub created_at: Option<serde_json::Value>,
    pub updated_at: Option<serde_json::Value>,
    pub user: Option<serde_json::Value>,
}

impl TodoWrite {
    pub fn validate(self) -> Result<NewTodo, ApiError> {
        let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();

        let read_only = [
            ("id", self.id.is_some()),
            ("created_at", self.created_at.is_some()),
            ("updated_at", self.updated_at.is_some()),
            ("user", self.user.is_some()),
        ];
        for (field, supplied) in read_only {
            if supplied {
                errors
                    .entry(field.to_string())
                    .or_default()
                    .push("This field is read-only.".to_string());
            }
        }

        let title = match self.title {
            None => {
                errors
                    .entry("title".to_string())
                    .or_default()
                    .push("This field is required.".to_string());
                None
            }
            Some(title) if title.trim().is_empty() => {
                errors
                    .entry("title".to_string())
                    .or_default()
                    .push("This field may not be blank.".to_string());
                None
            }
            Some(title) => Some(title.trim().to_string()),
        };

        match (errors.is_empty(), title) {
            (true, Some(title)) => Ok(NewTodo {
                title,
                description: self.description.unwrap_or_default(),
                is_completed: self.is_completed.unwrap_or(false),
            }),
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn errors(result: Result<NewTodo, ApiError>) -> BTreeMap<String, Vec<String>> {
        match result {
            Err(ApiError::Validation(fields)) => fields,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn timestamps_render_with_microseconds_and_z() {
        let ts = Utc
            .with_ymd_and_hms(2024, 1, 15, 10, 30, 0)
            .unwrap()
            .with_nanosecond(123_456_000)
            .unwrap();
        assert_eq!(format_timestamp(ts), "2024-01-15T10:30:00.123456Z");
    }

    #[test]
    fn whole_seconds_still_render_six_digits() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(format_timestamp(ts), "2024-01-15T10:30:00.000000Z");
    }

    #[test]
    fn serializes_all_read_fields() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let out = TodoOut::from(Todo {
            id: 7,
            user: "alice".to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            is_completed: true,
            created_at: ts,
            updated_at: ts,
        });
        let value = serde_json::to_value(&out).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 7,
                "title": "t",
                "description": "d",
                "is_completed": true,
                "created_at": "2024-01-15T10:30:00.000000Z",
                "updated_at": "2024-01-15T10:30:00.000000Z",
                "user": "alice",
            })
        );
    }

    #[test]
    fn missing_title_is_required() {
        let fields = errors(TodoWrite::default().validate());
        assert_eq!(fields["title"], vec!["This field is required."]);
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn blank_title_is_rejected() {
        let write = TodoWrite {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        let fields = errors(write.validate());
        assert_eq!(fields["title"], vec!["This field may not be blank."]);
    }

    #[test]
    fn server_assigned_fields_are_rejected() {
        let write = TodoWrite {
            title: Some("ok".to_string()),
            user: Some(serde_json::json!("mallory")),
            id: Some(serde_json::json!(1)),
            ..Default::default()
        };
        let fields = errors(write.validate());
        assert_eq!(fields["user"], vec!["This field is read-only."]);
        assert_eq!(fields["id"], vec!["This field is read-only."]);
    }

    #[test]
    fn defaults_apply_to_optional_fields() {
        let write = TodoWrite {
            title: Some("just a title".to_string()),
            ..Default::default()
        };
        let input = write.validate().unwrap();
        assert_eq!(input.title, "just a title");
        assert_eq!(input.description, "");
        assert!(!input.is_completed);
    }
}
