// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Session continuity summary shown when a user reconnects
//!
//! Read-only: nothing here creates or repairs state files.

use std::path::Path;

use serde::Serialize;

use crate::store::todos::pending_texts;
use crate::store::{ProjectStore, StateSnapshot};

const DEFAULT_TASK: &str = "no specific task";
const DEFAULT_ACTION: &str = "no action recorded";

/// Pending tasks listed by name before summarizing the rest
const LISTED_PENDING: usize = 3;

/// What a returning user was doing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinuitySummary {
    pub last_task: String,
    pub last_action: String,
    pub pending_tasks: Vec<String>,
}

impl ContinuitySummary {
    /// `None` when neither document contributed anything.
    pub fn from_snapshot(snapshot: &StateSnapshot) -> Option<Self> {
        if snapshot.is_empty() {
            return None;
        }

        let tree = snapshot.session_tree.as_ref();
        let pending_tasks = snapshot
            .todos
            .as_deref()
            .map(|todos| pending_texts(todos).into_iter().map(str::to_string).collect())
            .unwrap_or_default();

        Some(Self {
            last_task: tree
                .and_then(|t| t.last_task.clone())
                .unwrap_or_else(|| DEFAULT_TASK.to_string()),
            last_action: tree
                .and_then(|t| t.last_action.clone())
                .unwrap_or_else(|| DEFAULT_ACTION.to_string()),
            pending_tasks,
        })
    }

    pub fn message(&self) -> String {
        let head = format!(
            "System resumed. You were working on {}. Last action was {}.",
            self.last_task, self.last_action
        );

        if self.pending_tasks.is_empty() {
            return format!("{} No pending tasks.", head);
        }

        let mut listed = self
            .pending_tasks
            .iter()
            .take(LISTED_PENDING)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        if self.pending_tasks.len() > LISTED_PENDING {
            listed.push_str(&format!(
                ", and {} more",
                self.pending_tasks.len() - LISTED_PENDING
            ));
        } else if listed.is_empty() {
            listed.push_str("none");
        }

        format!("{} Pending tasks: {}.", head, listed)
    }
}

/// Load the owner's state and summarize it, or `None` for a fresh user.
pub fn load_summary(
    store: &ProjectStore,
    project_path: &Path,
    user_id: Option<&str>,
) -> Option<ContinuitySummary> {
    match store.snapshot(project_path, user_id) {
        Ok(snapshot) => ContinuitySummary::from_snapshot(&snapshot),
        Err(e) => {
            tracing::warn!("Session continuity unavailable: {}", e);
            None
        }
    }
}

/// One-paragraph continuation message, or `None` for a fresh user.
pub fn build_continuity_message(
    store: &ProjectStore,
    project_path: &Path,
    user_id: Option<&str>,
) -> Option<String> {
    load_summary(store, project_path, user_id).map(|summary| summary.message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn summary(pending: &[&str]) -> ContinuitySummary {
        ContinuitySummary {
            last_task: "refactor auth".to_string(),
            last_action: "chat_message_processed".to_string(),
            pending_tasks: pending.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_message_with_pending() {
        assert_eq!(
            summary(&["write tests", "update docs"]).message(),
            "System resumed. You were working on refactor auth. \
             Last action was chat_message_processed. Pending tasks: write tests, update docs."
        );
    }

    #[test]
    fn test_message_without_pending() {
        assert_eq!(
            summary(&[]).message(),
            "System resumed. You were working on refactor auth. \
             Last action was chat_message_processed. No pending tasks."
        );
    }

    #[test]
    fn test_message_summarizes_overflow() {
        let message = summary(&["a", "b", "c", "d", "e"]).message();
        assert!(message.ends_with("Pending tasks: a, b, c, and 2 more."));
    }

    #[test]
    fn test_blank_pending_text_reads_none() {
        let message = summary(&[""]).message();
        assert!(message.ends_with("Pending tasks: none."));
    }

    #[test]
    fn test_fresh_user_has_no_message() {
        let temp_dir = TempDir::new().unwrap();
        let store = ProjectStore::new();
        assert!(build_continuity_message(&store, temp_dir.path(), Some("u1")).is_none());
    }

    #[test]
    fn test_defaults_when_tree_lacks_task() {
        let temp_dir = TempDir::new().unwrap();
        let store = ProjectStore::new();
        store.add_todo(temp_dir.path(), Some("u1"), "ship it").unwrap();

        let message = build_continuity_message(&store, temp_dir.path(), Some("u1")).unwrap();
        assert_eq!(
            message,
            "System resumed. You were working on no specific task. \
             Last action was no action recorded. Pending tasks: ship it."
        );
    }

    #[test]
    fn test_does_not_create_state() {
        let temp_dir = TempDir::new().unwrap();
        let store = ProjectStore::new();
        build_continuity_message(&store, temp_dir.path(), None);
        assert!(!temp_dir.path().join(".bapXcoder").exists());
    }

    #[test]
    fn test_invalid_user_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = ProjectStore::new();
        assert!(build_continuity_message(&store, temp_dir.path(), Some("../x")).is_none());
    }
}
