// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Todo list documents
//!
//! Three on-disk shapes are accepted when loading: a JSON array of items,
//! an object with a `todos` array, or a single item object. Lists are
//! always written back as a plain array.

use std::path::Path;

use serde_json::Value;

use super::document::read_document;
use super::schema::TodoItem;
use crate::error::{BapxError, Result};

/// Normalize any accepted todo document shape into a list.
///
/// Entries that do not parse as a todo are dropped with a warning.
pub fn parse_todo_document(value: Value) -> Vec<TodoItem> {
    let entries = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("todos") {
            Some(Value::Array(items)) => items,
            Some(_) => Vec::new(),
            None => vec![Value::Object(map)],
        },
        Value::Null => Vec::new(),
        other => {
            tracing::warn!("Ignoring todo document of unexpected type: {}", other);
            Vec::new()
        }
    };

    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<TodoItem>(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("Skipping malformed todo entry: {}", e);
                None
            }
        })
        .collect()
}

/// Load a todo file: `Ok(None)` if absent, `CorruptState` if unparseable.
pub fn load_todo_file(path: &Path) -> Result<Option<Vec<TodoItem>>> {
    Ok(read_document(path)?.map(parse_todo_document))
}

/// Load a todo file, treating corruption as an empty list.
pub fn load_todos_lenient(path: &Path) -> Result<Vec<TodoItem>> {
    match load_todo_file(path) {
        Ok(todos) => Ok(todos.unwrap_or_default()),
        Err(e @ BapxError::CorruptState { .. }) => {
            tracing::warn!("{}; treating todo list as empty", e);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// Texts of items not yet completed, in list order
pub fn pending_texts(todos: &[TodoItem]) -> Vec<&str> {
    todos
        .iter()
        .filter(|t| t.is_pending())
        .map(|t| t.text.as_str())
        .collect()
}
