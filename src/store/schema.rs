// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Persisted document types

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::timestamp;
use super::todos::parse_todo_document;

/// Maximum number of entries kept in `recent_files`
pub const MAX_RECENT_FILES: usize = 10;

/// A single todo entry.
///
/// `text` is the canonical key; files written by older front-ends used `item`,
/// which is still accepted on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    #[serde(alias = "item")]
    pub text: String,
    #[serde(
        rename = "timestamp",
        alias = "created_at",
        default = "Utc::now",
        with = "timestamp"
    )]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl TodoItem {
    pub fn new(text: impl Into<String>, user_id: Option<&str>) -> Self {
        Self {
            text: text.into(),
            created_at: Utc::now(),
            user_id: user_id.map(str::to_string),
            completed: false,
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.completed
    }
}

/// Size and last access of a file touched through the explorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileStat {
    pub size: u64,
    #[serde(alias = "accessed", default = "Utc::now", with = "timestamp")]
    pub accessed_at: DateTime<Utc>,
    #[serde(default)]
    pub active: bool,
}

/// Per-user session record stored in `sessiontree.json`.
///
/// Keys this struct does not know about are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTree {
    #[serde(default, deserialize_with = "lenient")]
    pub project_path: String,
    #[serde(default = "Utc::now", with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient")]
    pub session_count: u64,
    #[serde(default, with = "timestamp::option")]
    pub last_session: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub last_activity: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_task: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_action: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_command: Option<String>,
    #[serde(default, with = "timestamp::option")]
    pub last_command_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient")]
    pub active_files: BTreeSet<String>,
    #[serde(default, deserialize_with = "lenient_file_stats")]
    pub file_stats: BTreeMap<String, FileStat>,
    #[serde(default, deserialize_with = "lenient")]
    pub recent_files: Vec<String>,
    #[serde(default, deserialize_with = "lenient_todos")]
    pub todos: Vec<TodoItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A field of the wrong shape reads as its default instead of failing the
/// whole document.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!("Ignoring session tree field of unexpected shape: {}", e);
        T::default()
    }))
}

fn lenient_file_stats<'de, D>(deserializer: D) -> Result<BTreeMap<String, FileStat>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        tracing::warn!("Ignoring file_stats that is not an object");
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|(path, stat)| match serde_json::from_value(stat) {
            Ok(stat) => Some((path, stat)),
            Err(e) => {
                tracing::warn!("Skipping file stat for {}: {}", path, e);
                None
            }
        })
        .collect())
}

fn lenient_todos<'de, D>(deserializer: D) -> Result<Vec<TodoItem>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(parse_todo_document(Value::deserialize(deserializer)?))
}

impl SessionTree {
    /// Fresh record for a project
    pub fn new(project_path: &Path) -> Self {
        Self {
            project_path: project_path.to_string_lossy().to_string(),
            created_at: Utc::now(),
            session_count: 0,
            last_session: None,
            last_activity: None,
            last_task: None,
            last_action: None,
            last_command: None,
            last_command_time: None,
            active_files: BTreeSet::new(),
            file_stats: BTreeMap::new(),
            recent_files: Vec::new(),
            todos: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Build from a raw document.
    ///
    /// Known fields of an unexpected shape read as their defaults; every other
    /// field and every unknown key is carried over. Only a document that is not
    /// an object at all yields a fresh record.
    pub fn from_document(value: Value, project_path: &Path) -> Self {
        let mut tree = match serde_json::from_value::<SessionTree>(value) {
            Ok(tree) => tree,
            Err(e) => {
                tracing::warn!("Session tree has unexpected shape, using defaults: {}", e);
                Self::new(project_path)
            }
        };
        if tree.project_path.is_empty() {
            tree.project_path = project_path.to_string_lossy().to_string();
        }
        tree
    }

    /// Record a file access with move-to-front semantics, capped at `MAX_RECENT_FILES`.
    pub fn touch_file(&mut self, rel_path: &str, size: u64) {
        self.file_stats.insert(
            rel_path.to_string(),
            FileStat {
                size,
                accessed_at: Utc::now(),
                active: true,
            },
        );
        self.active_files.insert(rel_path.to_string());

        self.recent_files.retain(|p| p != rel_path);
        self.recent_files.insert(0, rel_path.to_string());
        self.recent_files.truncate(MAX_RECENT_FILES);
    }

    /// Mark a file as no longer active. Returns whether it was active.
    pub fn release_file(&mut self, rel_path: &str) -> bool {
        if let Some(stat) = self.file_stats.get_mut(rel_path) {
            stat.active = false;
        }
        self.active_files.remove(rel_path)
    }

    pub fn touch(&mut self) {
        self.last_activity = Some(Utc::now());
    }
}

/// One chat turn as sent by the front-end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Last exchange of a conversation, stored in `session.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    #[serde(default)]
    pub messages: Vec<ChatTurn>,
    #[serde(default)]
    pub last_message: String,
    #[serde(default)]
    pub response: String,
    #[serde(default = "Utc::now", with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_todo_accepts_item_alias() {
        let todo: TodoItem = serde_json::from_value(json!({
            "item": "write tests",
            "timestamp": "2024-05-01T09:00:00.000001",
            "user_id": "u1",
            "completed": false
        }))
        .unwrap();
        assert_eq!(todo.text, "write tests");
        assert_eq!(todo.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_todo_writes_canonical_keys() {
        let todo = TodoItem::new("fix bug", None);
        let value = serde_json::to_value(&todo).unwrap();
        assert_eq!(value["text"], "fix bug");
        assert!(value.get("item").is_none());
        assert!(value.get("timestamp").is_some());
        assert!(value.get("user_id").is_none());
        assert_eq!(value["completed"], false);
    }

    #[test]
    fn test_todo_missing_completed_defaults_false() {
        let todo: TodoItem = serde_json::from_value(json!({"text": "x"})).unwrap();
        assert!(todo.is_pending());
    }

    #[test]
    fn test_session_tree_preserves_unknown_keys() {
        let tree: SessionTree = serde_json::from_value(json!({
            "project_path": "/p",
            "project_type": "python",
            "dependencies": ["flask"]
        }))
        .unwrap();
        assert_eq!(tree.extra["project_type"], "python");

        let back = serde_json::to_value(&tree).unwrap();
        assert_eq!(back["dependencies"], json!(["flask"]));
        assert_eq!(back["project_path"], "/p");
    }

    #[test]
    fn test_session_tree_from_bad_shape_keeps_extras() {
        let tree = SessionTree::from_document(
            json!({"recent_files": "not-a-list", "custom": 1}),
            Path::new("/proj"),
        );
        assert!(tree.recent_files.is_empty());
        assert_eq!(tree.project_path, "/proj");
        assert_eq!(tree.extra["custom"], 1);
        assert!(!tree.extra.contains_key("recent_files"));
    }

    #[test]
    fn test_one_bad_field_keeps_the_rest() {
        let tree = SessionTree::from_document(
            json!({
                "project_path": "/old",
                "session_count": 7,
                "last_task": {"title": "refactor"},
                "recent_files": ["a.py"],
                "file_stats": {"a.py": {"size": 3}, "b.py": "broken"},
                "todos": [{"text": "keep me"}, {"completed": true}]
            }),
            Path::new("/proj"),
        );
        assert_eq!(tree.project_path, "/old");
        assert_eq!(tree.session_count, 7);
        assert!(tree.last_task.is_none());
        assert_eq!(tree.recent_files, vec!["a.py"]);
        assert_eq!(tree.file_stats.len(), 1);
        assert_eq!(tree.todos.len(), 1);
        assert_eq!(tree.todos[0].text, "keep me");
    }

    #[test]
    fn test_session_tree_from_non_object_is_fresh() {
        let tree = SessionTree::from_document(json!(["nope"]), Path::new("/proj"));
        assert_eq!(tree.project_path, "/proj");
        assert_eq!(tree.session_count, 0);
        assert!(tree.extra.is_empty());
    }

    #[test]
    fn test_touch_file_moves_to_front() {
        let mut tree = SessionTree::new(Path::new("/p"));
        tree.touch_file("a.py", 1);
        tree.touch_file("b.py", 2);
        tree.touch_file("a.py", 3);

        assert_eq!(tree.recent_files, vec!["a.py", "b.py"]);
        assert_eq!(tree.file_stats["a.py"].size, 3);
        assert!(tree.active_files.contains("b.py"));
    }

    #[test]
    fn test_release_file() {
        let mut tree = SessionTree::new(Path::new("/p"));
        tree.touch_file("a.py", 1);
        assert!(tree.release_file("a.py"));
        assert!(!tree.release_file("a.py"));
        assert!(!tree.file_stats["a.py"].active);
    }

    #[test]
    fn test_file_stat_accepts_accessed_alias() {
        let stat: FileStat = serde_json::from_value(json!({
            "size": 10,
            "accessed": "2024-01-01T00:00:00",
            "active": true
        }))
        .unwrap();
        assert_eq!(stat.size, 10);
        assert!(stat.active);
    }
}
