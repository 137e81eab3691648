use rusqlite::types::Value;
use serde::Deserialize;

/// Optional list filters, deserialized straight from the query string.
/// Present filters are ANDed together; absent ones impose no constraint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoFilters {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
}

impl TodoFilters {
    /// SQL form of the filter: `WHERE` clauses plus their bind values, in
    /// order. Substring matches are case-insensitive; an empty needle matches
    /// every row.
    pub fn sql_clauses(&self) -> (Vec<&'static str>, Vec<Value>) {
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        if let Some(title) = &self.title {
            clauses.push(r"lower(title) LIKE lower(?) ESCAPE '\'");
            params.push(Value::Text(like_pattern(title)));
        }
        if let Some(description) = &self.description {
            clauses.push(r"lower(description) LIKE lower(?) ESCAPE '\'");
            params.push(Value::Text(like_pattern(description)));
        }
        if let Some(is_completed) = self.is_completed {
            clauses.push("is_completed = ?");
            params.push(Value::Integer(is_completed as i64));
        }
        (clauses, params)
    }

    /// Predicate form of the same filter, over the filterable fields.
    pub fn matches(&self, title: &str, description: &str, is_completed: bool) -> bool {
        let contains = |haystack: &str, needle: &str| {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        };
        self.title.as_deref().map_or(true, |t| contains(title, t))
            && self
                .description
                .as_deref()
                .map_or(true, |d| contains(description, d))
            && self.is_completed.map_or(true, |c| is_completed == c)
    }
}

// LIKE wildcards in the needle are literals, per icontains semantics.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', r"\\")
        .replace('%', r"\%")
        .replace('_', r"\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_filters_match_everything() {
        let filters = TodoFilters::default();
        assert!(filters.matches("anything", "at all", true));
        assert!(filters.matches("", "", false));
    }

    #[test]
    fn substring_match_is_case_insensitive() {
        let filters = TodoFilters {
            title: Some("TeSt".to_string()),
            ..Default::default()
        };
        assert!(filters.matches("my test todo", "", false));
        assert!(!filters.matches("unteost", "", false));
    }

    #[test]
    fn empty_needle_matches_everything() {
        let filters = TodoFilters {
            title: Some(String::new()),
            description: Some(String::new()),
            ..Default::default()
        };
        assert!(filters.matches("whatever", "", true));
    }

    #[test]
    fn present_filters_are_anded() {
        let filters = TodoFilters {
            title: Some("test".to_string()),
            is_completed: Some(true),
            ..Default::default()
        };
        assert!(filters.matches("test 1", "", true));
        assert!(!filters.matches("test 2", "", false));
        assert!(!filters.matches("other", "", true));
    }

    #[test]
    fn sql_clauses_follow_field_order() {
        let filters = TodoFilters {
            title: Some("a".to_string()),
            description: None,
            is_completed: Some(false),
        };
        let (clauses, params) = filters.sql_clauses();
        assert_eq!(clauses.len(), 2);
        assert_eq!(params, vec![
            Value::Text("%a%".to_string()),
            Value::Integer(0),
        ]);
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(like_pattern("50%_done"), r"%50\%\_done%");
    }
}
