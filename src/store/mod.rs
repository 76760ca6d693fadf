// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Project-local state persistence
//!
//! Every project owns a `.bapXcoder` control directory holding, per user,
//! a todo list and a session tree (plus legacy top-level copies for
//! no-auth mode). All mutation is a whole-document read-modify-write.
//!
//! ## Concurrency
//!
//! With locking enabled (the default) each read-modify-write cycle holds a
//! mutex keyed by the owner's state directory, so concurrent `add_todo`
//! calls for the same `(project, user)` both land. With locking disabled the
//! last writer wins. Either way documents are replaced atomically and are
//! never left half-written.
//!
//! ## Corruption
//!
//! A document that exists but does not parse is logged and treated as
//! empty/default. Only IO failures and invalid user ids reach the caller.

pub mod document;
pub mod paths;
pub mod schema;
pub mod timestamp;
pub mod todos;
pub mod validation;

use std::path::Path;

use chrono::Utc;
use serde_json::{Map, Value};

use crate::config::StoreConfig;
use crate::error::{BapxError, Result};

use document::{read_document, write_document, KeyedLocks};
pub use paths::{ControlDirectory, StateOwner, CONTROL_DIR};
pub use schema::{ChatTurn, ConversationRecord, FileStat, SessionTree, TodoItem, MAX_RECENT_FILES};
use todos::{load_todo_file, load_todos_lenient};
pub use validation::{ValidationLog, ValidationRecord, ValidationSummary};

/// What exists on disk for one owner, with unreadable documents reported as absent
#[derive(Debug, Clone, Default)]
pub struct StateSnapshot {
    pub session_tree: Option<SessionTree>,
    pub todos: Option<Vec<TodoItem>>,
}

impl StateSnapshot {
    pub fn is_empty(&self) -> bool {
        self.session_tree.is_none() && self.todos.is_none()
    }
}

/// Durable per-project, per-user state backed by JSON documents
pub struct ProjectStore {
    locks: KeyedLocks,
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectStore {
    /// Store with per-owner write locking enabled
    pub fn new() -> Self {
        Self::with_locking(true)
    }

    pub fn with_locking(enabled: bool) -> Self {
        Self {
            locks: KeyedLocks::new(enabled),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::with_locking(config.lock_writes)
    }

    pub fn is_locking(&self) -> bool {
        self.locks.is_enabled()
    }

    /// Create the project's control directory if it is missing.
    pub fn ensure_project(&self, project_path: &Path) -> Result<ControlDirectory> {
        let control = ControlDirectory::for_project(project_path);
        if !control.exists() {
            std::fs::create_dir_all(control.path())?;
            tracing::info!("Initialized {}", control.path().display());
        }
        Ok(control)
    }

    fn resolve(
        &self,
        project_path: &Path,
        user_id: Option<&str>,
    ) -> Result<(ControlDirectory, StateOwner)> {
        let owner = StateOwner::from_user_id(user_id)?;
        Ok((ControlDirectory::for_project(project_path), owner))
    }

    fn locked<T>(
        &self,
        control: &ControlDirectory,
        owner: &StateOwner,
        f: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        self.locks.with_lock(&control.state_dir(owner), f)
    }

    // ==================== Todos ====================

    /// The owner's todo list; empty when the file is missing or unreadable.
    pub fn get_todos(&self, project_path: &Path, user_id: Option<&str>) -> Result<Vec<TodoItem>> {
        let (control, owner) = self.resolve(project_path, user_id)?;
        load_todos_lenient(&control.todo_path(&owner))
    }

    /// Append a pending todo and mirror the list into the session tree.
    pub fn add_todo(
        &self,
        project_path: &Path,
        user_id: Option<&str>,
        text: &str,
    ) -> Result<TodoItem> {
        if text.trim().is_empty() {
            return Err(BapxError::InvalidInput("todo text must not be empty".to_string()));
        }

        let (control, owner) = self.resolve(project_path, user_id)?;
        let item = TodoItem::new(text, owner.user_id());

        self.locked(&control, &owner, || {
            let path = control.todo_path(&owner);
            let mut todos = load_todos_lenient(&path)?;
            todos.push(item.clone());
            write_document(&path, &todos)?;
            self.sync_tree_todos(project_path, &control, &owner, todos)
        })?;

        tracing::debug!("Added todo for {:?}: {}", owner, item.text);
        Ok(item)
    }

    /// Remove the todo at `index`. Out-of-range indices are a no-op returning `false`.
    pub fn remove_todo(
        &self,
        project_path: &Path,
        user_id: Option<&str>,
        index: usize,
    ) -> Result<bool> {
        let (control, owner) = self.resolve(project_path, user_id)?;

        self.locked(&control, &owner, || {
            let path = control.todo_path(&owner);
            let mut todos = load_todos_lenient(&path)?;
            if index >= todos.len() {
                return Ok(false);
            }
            todos.remove(index);
            write_document(&path, &todos)?;
            self.sync_tree_todos(project_path, &control, &owner, todos)?;
            Ok(true)
        })
    }

    /// Set the completion flag of the todo at `index`; `false` if out of range.
    pub fn set_todo_completed(
        &self,
        project_path: &Path,
        user_id: Option<&str>,
        index: usize,
        completed: bool,
    ) -> Result<bool> {
        let (control, owner) = self.resolve(project_path, user_id)?;

        self.locked(&control, &owner, || {
            let path = control.todo_path(&owner);
            let mut todos = load_todos_lenient(&path)?;
            let Some(item) = todos.get_mut(index) else {
                return Ok(false);
            };
            item.completed = completed;
            write_document(&path, &todos)?;
            self.sync_tree_todos(project_path, &control, &owner, todos)?;
            Ok(true)
        })
    }

    fn sync_tree_todos(
        &self,
        project_path: &Path,
        control: &ControlDirectory,
        owner: &StateOwner,
        todos: Vec<TodoItem>,
    ) -> Result<()> {
        modify_tree_document(project_path, &control.session_tree_path(owner), |tree| {
            tree.todos = todos;
        })?;
        Ok(())
    }

    // ==================== Session tree ====================

    fn load_tree(
        &self,
        project_path: &Path,
        control: &ControlDirectory,
        owner: &StateOwner,
    ) -> Result<SessionTree> {
        match read_document(&control.session_tree_path(owner)) {
            Ok(Some(value)) => Ok(SessionTree::from_document(value, project_path)),
            Ok(None) => Ok(SessionTree::new(project_path)),
            Err(e) if e.is_recoverable() => {
                tracing::warn!("{}; using a fresh session tree", e);
                Ok(SessionTree::new(project_path))
            }
            Err(e) => Err(e),
        }
    }

    fn mutate_tree<T>(
        &self,
        project_path: &Path,
        user_id: Option<&str>,
        f: impl FnOnce(&mut SessionTree) -> T,
    ) -> Result<(T, SessionTree)> {
        let (control, owner) = self.resolve(project_path, user_id)?;
        self.locked(&control, &owner, || {
            modify_tree_document(project_path, &control.session_tree_path(&owner), f)
        })
    }

    /// The owner's session tree, or a fresh default (not persisted) if none exists.
    pub fn get_session_tree(
        &self,
        project_path: &Path,
        user_id: Option<&str>,
    ) -> Result<SessionTree> {
        let (control, owner) = self.resolve(project_path, user_id)?;
        self.load_tree(project_path, &control, &owner)
    }

    /// Shallow-merge `fields` into the stored session tree and refresh `last_activity`.
    ///
    /// Keys not mentioned in `fields`, including ones this crate does not know,
    /// are preserved.
    pub fn update_session_tree(
        &self,
        project_path: &Path,
        user_id: Option<&str>,
        fields: Map<String, Value>,
    ) -> Result<()> {
        let (control, owner) = self.resolve(project_path, user_id)?;
        let path = control.session_tree_path(&owner);

        self.locked(&control, &owner, || {
            let mut doc = load_tree_document(project_path, &path)?;
            for (key, value) in fields {
                doc.insert(key, value);
            }
            doc.insert(
                "last_activity".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );

            write_document(&path, &Value::Object(doc))
        })
    }

    /// Update `file_stats` and move `rel_path` to the front of `recent_files`.
    pub fn record_file_access(
        &self,
        project_path: &Path,
        user_id: Option<&str>,
        rel_path: &str,
        size_bytes: u64,
    ) -> Result<()> {
        self.mutate_tree(project_path, user_id, |tree| {
            tree.touch_file(rel_path, size_bytes)
        })?;
        tracing::debug!("Recorded access to {} ({} bytes)", rel_path, size_bytes);
        Ok(())
    }

    /// Drop `rel_path` from `active_files`. Returns whether it was active.
    pub fn release_file(
        &self,
        project_path: &Path,
        user_id: Option<&str>,
        rel_path: &str,
    ) -> Result<bool> {
        let (was_active, _) =
            self.mutate_tree(project_path, user_id, |tree| tree.release_file(rel_path))?;
        Ok(was_active)
    }

    /// Most-recently-accessed files first, at most `MAX_RECENT_FILES`.
    pub fn recent_files(&self, project_path: &Path, user_id: Option<&str>) -> Result<Vec<String>> {
        let mut recent = self.get_session_tree(project_path, user_id)?.recent_files;
        recent.truncate(MAX_RECENT_FILES);
        Ok(recent)
    }

    /// Count a new session for the owner. Called by the host on connect.
    pub fn begin_session(
        &self,
        project_path: &Path,
        user_id: Option<&str>,
    ) -> Result<SessionTree> {
        let (_, tree) = self.mutate_tree(project_path, user_id, |tree| {
            tree.session_count += 1;
            tree.last_session = Some(Utc::now());
        })?;
        Ok(tree)
    }

    /// Remember the last terminal command the owner ran.
    pub fn record_command(
        &self,
        project_path: &Path,
        user_id: Option<&str>,
        command: &str,
    ) -> Result<()> {
        self.mutate_tree(project_path, user_id, |tree| {
            tree.last_command = Some(command.to_string());
            tree.last_command_time = Some(Utc::now());
        })?;
        Ok(())
    }

    /// Read both owner documents without creating or repairing anything.
    pub fn snapshot(&self, project_path: &Path, user_id: Option<&str>) -> Result<StateSnapshot> {
        let (control, owner) = self.resolve(project_path, user_id)?;

        let session_tree = match read_document(&control.session_tree_path(&owner)) {
            Ok(doc) => doc.map(|value| SessionTree::from_document(value, project_path)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable session tree: {}", e);
                None
            }
        };

        let todos = match load_todo_file(&control.todo_path(&owner)) {
            Ok(todos) => todos,
            Err(e) => {
                tracing::warn!("Ignoring unreadable todo list: {}", e);
                None
            }
        };

        Ok(StateSnapshot {
            session_tree,
            todos,
        })
    }

    // ==================== Conversation ====================

    /// Replace the owner's stored conversation record.
    pub fn store_conversation(
        &self,
        project_path: &Path,
        user_id: Option<&str>,
        record: &ConversationRecord,
    ) -> Result<()> {
        let (control, owner) = self.resolve(project_path, user_id)?;
        self.locked(&control, &owner, || {
            write_document(&control.conversation_path(&owner), record)
        })
    }

    /// The owner's last conversation record, if one is readable.
    pub fn load_conversation(
        &self,
        project_path: &Path,
        user_id: Option<&str>,
    ) -> Result<Option<ConversationRecord>> {
        let (control, owner) = self.resolve(project_path, user_id)?;
        match read_document(&control.conversation_path(&owner)) {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(record) => Ok(Some(record)),
                Err(e) => {
                    tracing::warn!("Ignoring malformed conversation record: {}", e);
                    Ok(None)
                }
            },
            Ok(None) => Ok(None),
            Err(e) if e.is_recoverable() => {
                tracing::warn!("{}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    // ==================== Validation log ====================

    fn load_validation_log(&self, control: &ControlDirectory) -> Result<ValidationLog> {
        match read_document(&control.validation_log_path()) {
            Ok(Some(value)) => Ok(serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::warn!("Validation log has unexpected shape, resetting: {}", e);
                ValidationLog::default()
            })),
            Ok(None) => Ok(ValidationLog::default()),
            Err(e) if e.is_recoverable() => {
                tracing::warn!("{}; resetting validation log", e);
                Ok(ValidationLog::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Append a validation result to the project's log.
    pub fn record_validation(
        &self,
        project_path: &Path,
        record: ValidationRecord,
    ) -> Result<ValidationSummary> {
        let control = ControlDirectory::for_project(project_path);
        self.locks.with_lock(control.path(), || {
            let mut log = self.load_validation_log(&control)?;
            log.record(record);
            write_document(&control.validation_log_path(), &log)?;
            Ok(log.summary())
        })
    }

    pub fn validation_summary(&self, project_path: &Path) -> Result<ValidationSummary> {
        let control = ControlDirectory::for_project(project_path);
        Ok(self.load_validation_log(&control)?.summary())
    }
}

fn tree_fields(tree: &SessionTree) -> Result<Map<String, Value>> {
    match serde_json::to_value(tree)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// The raw session tree document, or a default one if absent or unreadable.
fn load_tree_document(project_path: &Path, path: &Path) -> Result<Map<String, Value>> {
    match read_document(path) {
        Ok(Some(Value::Object(map))) => Ok(map),
        Ok(Some(_)) => {
            tracing::warn!("{} is not a JSON object; starting fresh", path.display());
            tree_fields(&SessionTree::new(project_path))
        }
        Ok(None) => tree_fields(&SessionTree::new(project_path)),
        Err(e) if e.is_recoverable() => {
            tracing::warn!("{}; starting fresh", e);
            tree_fields(&SessionTree::new(project_path))
        }
        Err(e) => Err(e),
    }
}

/// Apply `f` to the typed tree and write back only the keys whose value changed.
///
/// Stored values the typed tree could not read stay on disk untouched unless
/// `f` replaces them. The caller holds the owner's lock.
fn modify_tree_document<T>(
    project_path: &Path,
    path: &Path,
    f: impl FnOnce(&mut SessionTree) -> T,
) -> Result<(T, SessionTree)> {
    let mut doc = load_tree_document(project_path, path)?;
    let mut tree = SessionTree::from_document(Value::Object(doc.clone()), project_path);
    let before = tree_fields(&tree)?;

    let out = f(&mut tree);
    tree.touch();

    for (key, value) in tree_fields(&tree)? {
        if before.get(&key) != Some(&value) {
            doc.insert(key, value);
        }
    }
    write_document(path, &Value::Object(doc))?;
    Ok((out, tree))
}
