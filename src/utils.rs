// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Utility functions for bapxcoder
//!
//! Pure helpers shared by the CLI and the library.

use std::path::{Path, PathBuf};

use crossterm::style::Color;

use crate::error::BapxError;
use crate::router::TargetCapability;

/// Format a size in bytes to human-readable form
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Keep the first `max_chars` characters, appending `...` if anything was cut.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Find the project root by looking for a control directory or common manifest files
///
/// Searches from the given directory upward. An existing `.bapXcoder`
/// directory takes precedence over manifests in the same directory.
pub fn find_project_root_from(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;

    let markers = [
        crate::store::CONTROL_DIR,
        "Cargo.toml",
        "package.json",
        "pyproject.toml",
        "requirements.txt",
        "go.mod",
        "pom.xml",
        ".git",
    ];

    loop {
        if markers.iter().any(|m| current.join(m).exists()) {
            return Some(current.to_path_buf());
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

/// Find the project root starting from current working directory
pub fn find_project_root() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| find_project_root_from(&cwd))
}

/// Format an error for display to the user
pub fn format_error(error: &BapxError) -> String {
    match error {
        BapxError::Http(e) if e.is_connect() => {
            "Model server is not reachable. Start Ollama or set BAPX_MODEL_URL.".to_string()
        }
        BapxError::InvalidInput(msg) => format!("Invalid input: {}", msg),
        _ => format!("Error: {}", error),
    }
}

/// Label color for a routing target
pub fn capability_color(target: TargetCapability) -> Color {
    match target {
        TargetCapability::Coder => Color::Green,
        TargetCapability::Interpreter => Color::Cyan,
    }
}
