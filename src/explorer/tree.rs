// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Project tree generation
//!
//! Nodes are keyed by their path relative to the project root. Hidden
//! entries are skipped except `.git`. Symlinked directories are followed
//! once; a directory whose real path was already visited is listed with
//! no children.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Directory listing keyed by relative path
pub type Tree = BTreeMap<String, TreeNode>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    File {
        size: u64,
        modified_at: Option<DateTime<Utc>>,
        extension: Option<String>,
    },
    Directory {
        modified_at: Option<DateTime<Utc>>,
        children: Tree,
    },
}

impl TreeNode {
    pub fn is_dir(&self) -> bool {
        matches!(self, TreeNode::Directory { .. })
    }
}

fn is_listed(name: &str) -> bool {
    !name.starts_with('.') || name == ".git"
}

pub(crate) fn relative_key(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

pub(crate) fn modified_at(metadata: &std::fs::Metadata) -> Option<DateTime<Utc>> {
    metadata.modified().ok().map(DateTime::<Utc>::from)
}

/// Walk `root` up to `max_depth` levels.
pub fn build_tree(root: &Path, max_depth: usize) -> Tree {
    let mut visited = HashSet::new();
    if let Ok(real) = std::fs::canonicalize(root) {
        visited.insert(real);
    }
    let mut tree = Tree::new();
    walk(root, root, max_depth, 0, &mut visited, &mut tree);
    tree
}

fn walk(
    root: &Path,
    dir: &Path,
    max_depth: usize,
    depth: usize,
    visited: &mut HashSet<PathBuf>,
    out: &mut Tree,
) {
    if depth >= max_depth {
        return;
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("Skipping unreadable directory {}: {}", dir.display(), e);
            return;
        }
    };

    for entry in entries.filter_map(|e| e.ok()) {
        let name = entry.file_name();
        if !is_listed(&name.to_string_lossy()) {
            continue;
        }

        let path = entry.path();
        // Follows symlinks; broken links are skipped.
        let Ok(metadata) = std::fs::metadata(&path) else {
            continue;
        };
        let key = relative_key(root, &path);

        if metadata.is_dir() {
            let mut children = Tree::new();
            match std::fs::canonicalize(&path) {
                Ok(real) => {
                    if visited.insert(real) {
                        walk(root, &path, max_depth, depth + 1, visited, &mut children);
                    } else {
                        tracing::debug!("Cycle detected at {}, not descending", path.display());
                    }
                }
                Err(e) => tracing::debug!("Cannot resolve {}: {}", path.display(), e),
            }
            out.insert(
                key,
                TreeNode::Directory {
                    modified_at: modified_at(&metadata),
                    children,
                },
            );
        } else {
            out.insert(
                key,
                TreeNode::File {
                    size: metadata.len(),
                    modified_at: modified_at(&metadata),
                    extension: path
                        .extension()
                        .map(|ext| format!(".{}", ext.to_string_lossy())),
                },
            );
        }
    }
}

/// Render a tree with box-drawing connectors, directories first.
pub fn render_tree(tree: &Tree) -> String {
    let mut output = String::new();
    render_level(tree, "", &mut output);
    output
}

fn render_level(tree: &Tree, prefix: &str, output: &mut String) {
    let mut entries: Vec<_> = tree.iter().collect();
    entries.sort_by(|(a_key, a), (b_key, b)| match (a.is_dir(), b.is_dir()) {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        _ => a_key.cmp(b_key),
    });

    let total = entries.len();
    for (i, (key, node)) in entries.into_iter().enumerate() {
        let is_last = i + 1 == total;
        let connector = if is_last { "└── " } else { "├── " };
        let name = key.rsplit('/').next().unwrap_or(key);

        output.push_str(prefix);
        output.push_str(connector);
        output.push_str(name);

        if let TreeNode::Directory { children, .. } = node {
            output.push_str("/\n");
            let child_prefix = if is_last { "    " } else { "│   " };
            render_level(children, &format!("{}{}", prefix, child_prefix), output);
        } else {
            output.push('\n');
        }
    }
}
