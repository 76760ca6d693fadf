// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! On-disk layout of the `.bapXcoder` control directory
//!
//! ```text
//! <project>/.bapXcoder/
//!   users/<user_id>/todo.json
//!   users/<user_id>/sessiontree.json
//!   users/<user_id>/session.json
//!   todo.json            legacy single-user mode
//!   sessiontree.json     legacy single-user mode
//!   session.json         legacy single-user mode
//!   validation_log.json
//! ```

use std::path::{Path, PathBuf};

use crate::error::{BapxError, Result};

/// Name of the per-project control directory
pub const CONTROL_DIR: &str = ".bapXcoder";

pub const TODO_FILE: &str = "todo.json";
pub const SESSION_TREE_FILE: &str = "sessiontree.json";
pub const CONVERSATION_FILE: &str = "session.json";
pub const VALIDATION_LOG_FILE: &str = "validation_log.json";

/// Whose state a document belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StateOwner {
    /// No-auth mode: top-level files in the control directory
    Legacy,
    /// An authenticated user with their own subdirectory
    User(String),
}

impl StateOwner {
    /// Resolve an optional user id, rejecting ids that are unsafe as directory names.
    pub fn from_user_id(user_id: Option<&str>) -> Result<Self> {
        match user_id {
            None => Ok(StateOwner::Legacy),
            Some(id) => {
                validate_user_id(id)?;
                Ok(StateOwner::User(id.to_string()))
            }
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            StateOwner::Legacy => None,
            StateOwner::User(id) => Some(id),
        }
    }
}

fn validate_user_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(BapxError::InvalidInput("user id must not be empty".to_string()));
    }
    if id == "." || id == ".." || id.contains(['/', '\\', '\0']) {
        return Err(BapxError::InvalidInput(format!(
            "user id '{}' is not a valid directory name",
            id
        )));
    }
    Ok(())
}

/// A project's `.bapXcoder` directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlDirectory {
    path: PathBuf,
}

impl ControlDirectory {
    pub fn for_project(project_path: &Path) -> Self {
        Self {
            path: project_path.join(CONTROL_DIR),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    /// Directory holding an owner's documents
    pub fn state_dir(&self, owner: &StateOwner) -> PathBuf {
        match owner {
            StateOwner::Legacy => self.path.clone(),
            StateOwner::User(id) => self.path.join("users").join(id),
        }
    }

    pub fn todo_path(&self, owner: &StateOwner) -> PathBuf {
        self.state_dir(owner).join(TODO_FILE)
    }

    pub fn session_tree_path(&self, owner: &StateOwner) -> PathBuf {
        self.state_dir(owner).join(SESSION_TREE_FILE)
    }

    pub fn conversation_path(&self, owner: &StateOwner) -> PathBuf {
        self.state_dir(owner).join(CONVERSATION_FILE)
    }

    pub fn validation_log_path(&self) -> PathBuf {
        self.path.join(VALIDATION_LOG_FILE)
    }
}
