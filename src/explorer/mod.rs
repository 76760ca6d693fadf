// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! File operations scoped to a project root
//!
//! Every operation returns a soft result (`FileRecord` or `OpOutcome`)
//! rather than an error. Successful reads and writes are recorded in the
//! owner's session tree through `ProjectStore`.

pub mod encoding;
pub mod search;
pub mod stats;
pub mod tree;

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::config::ExplorerConfig;
use crate::error::{BapxError, Result};
use crate::store::ProjectStore;

pub use encoding::{decode_with_fallback, TextEncoding};
pub use search::{SearchHit, SearchLimits};
pub use stats::ProjectStats;
pub use tree::{Tree, TreeNode};

/// Error text for a path that is absent or not a regular file
pub const MISSING_FILE: &str = "File does not exist";

/// Result of reading a file: exactly one of `content` and `error` is set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRecord {
    pub path: String,
    pub content: Option<String>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl FileRecord {
    fn ok(path: &str, content: String, encoding: TextEncoding) -> Self {
        Self {
            path: path.to_string(),
            content: Some(content),
            error: None,
            encoding: Some(encoding.label().to_string()),
        }
    }

    fn failed(path: &str, error: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            content: None,
            error: Some(error.into()),
            encoding: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.content.is_some()
    }
}

/// `(success, error)` pair returned by mutating operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpOutcome {
    pub success: bool,
    pub error: Option<String>,
}

impl OpOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Resolve a project-relative path, refusing anything that leaves the root.
///
/// Returns the normalized forward-slash key alongside the absolute path.
fn resolve_relative(root: &Path, rel_path: &str) -> Result<(String, PathBuf)> {
    let mut parts = Vec::new();
    for component in Path::new(rel_path).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().to_string()),
            Component::CurDir => {}
            _ => {
                return Err(BapxError::InvalidInput(format!(
                    "path '{}' is outside the project",
                    rel_path
                )))
            }
        }
    }
    if parts.is_empty() {
        return Err(BapxError::InvalidInput("path must not be empty".to_string()));
    }

    let full = parts.iter().fold(root.to_path_buf(), |acc, p| acc.join(p));
    Ok((parts.join("/"), full))
}

/// File explorer bound to one project root and one owner
pub struct FileExplorer {
    root: PathBuf,
    store: Arc<ProjectStore>,
    user_id: Option<String>,
    config: ExplorerConfig,
}

impl FileExplorer {
    pub fn new(root: impl Into<PathBuf>, store: Arc<ProjectStore>, user_id: Option<String>) -> Self {
        Self {
            root: root.into(),
            store,
            user_id,
            config: ExplorerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ExplorerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    fn record_access(&self, key: &str, size: u64) {
        if let Err(e) = self
            .store
            .record_file_access(&self.root, self.user_id(), key, size)
        {
            tracing::warn!("Could not record access to {}: {}", key, e);
        }
    }

    /// Directory tree up to `max_depth` levels.
    pub fn build_tree(&self, max_depth: usize) -> Tree {
        tree::build_tree(&self.root, max_depth)
    }

    /// Text rendering of the tree, directories first
    pub fn render_tree(&self, max_depth: usize) -> String {
        tree::render_tree(&self.build_tree(max_depth))
    }

    pub fn read_file(&self, rel_path: &str) -> FileRecord {
        let (key, full) = match resolve_relative(&self.root, rel_path) {
            Ok(resolved) => resolved,
            Err(e) => return FileRecord::failed(rel_path, e.to_string()),
        };

        if !full.is_file() {
            return FileRecord::failed(&key, MISSING_FILE);
        }

        let bytes = match std::fs::read(&full) {
            Ok(bytes) => bytes,
            Err(e) => return FileRecord::failed(&key, format!("Error reading file: {}", e)),
        };

        match decode_with_fallback(&bytes) {
            Some((content, encoding)) => {
                tracing::debug!("Read {} as {}", key, encoding);
                self.record_access(&key, bytes.len() as u64);
                FileRecord::ok(&key, content, encoding)
            }
            None => {
                let error = BapxError::Decode("Could not decode file".to_string());
                FileRecord::failed(&key, error.to_string())
            }
        }
    }

    /// Write UTF-8 content, creating parent directories as needed.
    pub fn write_file(&self, rel_path: &str, content: &str) -> OpOutcome {
        let (key, full) = match resolve_relative(&self.root, rel_path) {
            Ok(resolved) => resolved,
            Err(e) => return OpOutcome::failed(e.to_string()),
        };

        let written = full
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|_| std::fs::write(&full, content));

        match written {
            Ok(()) => {
                self.record_access(&key, content.len() as u64);
                OpOutcome::ok()
            }
            Err(e) => OpOutcome::failed(format!("Error saving file: {}", e)),
        }
    }

    pub fn create_file(&self, rel_path: &str, initial_content: &str) -> OpOutcome {
        self.write_file(rel_path, initial_content)
    }

    pub fn delete_file(&self, rel_path: &str) -> OpOutcome {
        let full = match resolve_relative(&self.root, rel_path) {
            Ok((_, full)) => full,
            Err(e) => return OpOutcome::failed(e.to_string()),
        };

        if !full.is_file() {
            return OpOutcome::failed(MISSING_FILE);
        }

        match std::fs::remove_file(&full) {
            Ok(()) => OpOutcome::ok(),
            Err(e) => OpOutcome::failed(format!("Error deleting file: {}", e)),
        }
    }

    /// Create a directory and its parents; succeeds if it already exists.
    pub fn create_directory(&self, rel_path: &str) -> OpOutcome {
        let full = match resolve_relative(&self.root, rel_path) {
            Ok((_, full)) => full,
            Err(e) => return OpOutcome::failed(e.to_string()),
        };

        match std::fs::create_dir_all(&full) {
            Ok(()) => OpOutcome::ok(),
            Err(e) => OpOutcome::failed(format!("Error creating directory: {}", e)),
        }
    }

    /// Search with explicit extensions, or the configured defaults when `None`.
    pub fn search(&self, query: &str, extensions: Option<&[String]>) -> Vec<SearchHit> {
        let extensions = extensions.unwrap_or(&self.config.search_extensions);
        search::search_project(
            &self.root,
            query,
            extensions,
            SearchLimits {
                max_results: self.config.max_search_results,
                max_line_numbers: self.config.max_line_numbers,
            },
        )
    }

    pub fn project_stats(&self) -> ProjectStats {
        stats::collect_stats(&self.root)
    }

    /// Recently accessed files for this owner; empty if state is unavailable.
    pub fn recent_files(&self) -> Vec<String> {
        self.store
            .recent_files(&self.root, self.user_id())
            .unwrap_or_else(|e| {
                tracing::warn!("Could not load recent files: {}", e);
                Vec::new()
            })
    }
}
