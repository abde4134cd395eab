//! Filter normalization for Mem0 queries
//!
//! Every filter sent to Mem0 is an `AND`/`OR`/`NOT` tree scoped to a user.
//! [`with_default_filters`] wraps bare filters in an `AND` and prepends the
//! default `user_id` when the caller did not constrain one.

use crate::types::{AppError, Result};
use serde_json::{Map, Value, json};

/// Top-level boolean combinators understood by Mem0
pub const COMBINATORS: [&str; 3] = ["AND", "OR", "NOT"];

const USER_ID: &str = "user_id";

/// Ensure `filters` exists, is combinator-rooted and mentions a `user_id`.
///
/// User constraints are never dropped or reordered; the only change besides
/// wrapping is a `{"user_id": default}` clause inserted at the head of the
/// top-level `AND` list. Fails if that insertion is needed and `AND` is not
/// a list.
pub fn with_default_filters(
    default_user_id: &str,
    filters: Option<Map<String, Value>>,
) -> Result<Value> {
    let mut filters = match filters {
        Some(filters) if !filters.is_empty() => filters,
        _ => return Ok(json!({ "AND": [{ "user_id": default_user_id }] })),
    };

    if !COMBINATORS.iter().any(|key| filters.contains_key(*key)) {
        let mut wrapped = Map::new();
        wrapped.insert("AND".to_string(), Value::Array(vec![Value::Object(filters)]));
        filters = wrapped;
    }

    if !filters.iter().any(|(key, value)| key == USER_ID || mentions_user_id(value)) {
        let clause = json!({ "user_id": default_user_id });
        match filters
            .entry("AND")
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(clauses) => clauses.insert(0, clause),
            other => {
                return Err(AppError::InvalidFilter(format!(
                    "filters['AND'] must be a list when present, got {}",
                    type_name(other)
                )));
            }
        }
    }

    Ok(Value::Object(filters))
}

/// Whether any object at any depth of `value` has a `user_id` key.
pub fn mentions_user_id(value: &Value) -> bool {
    match value {
        Value::Object(map) => map
            .iter()
            .any(|(key, nested)| key == USER_ID || mentions_user_id(nested)),
        Value::Array(items) => items.iter().any(mentions_user_id),
        _ => false,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
