// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Aggregate project statistics

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use walkdir::WalkDir;

use super::tree::modified_at;
use crate::store::CONTROL_DIR;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectStats {
    pub total_files: u64,
    pub total_directories: u64,
    pub total_size_bytes: u64,
    /// Extension (with leading dot, empty for none) to file count
    pub file_types: BTreeMap<String, u64>,
    pub most_common_extension: Option<String>,
    pub last_modified_at: Option<DateTime<Utc>>,
}

/// Walk the whole project once, excluding the control directory.
pub fn collect_stats(root: &Path) -> ProjectStats {
    let mut stats = ProjectStats::default();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| e.file_name() != CONTROL_DIR);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping entry during stats walk: {}", e);
                continue;
            }
        };
        let Ok(metadata) = entry.metadata() else {
            continue;
        };

        if let Some(modified) = modified_at(&metadata) {
            stats.last_modified_at = stats.last_modified_at.max(Some(modified));
        }

        if metadata.is_dir() {
            stats.total_directories += 1;
        } else if metadata.is_file() {
            stats.total_files += 1;
            stats.total_size_bytes += metadata.len();
            let ext = entry
                .path()
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            *stats.file_types.entry(ext).or_insert(0) += 1;
        }
    }

    // Ties resolve to the lexicographically smallest extension.
    stats.most_common_extension = stats
        .file_types
        .iter()
        .max_by(|(a_ext, a), (b_ext, b)| a.cmp(b).then_with(|| b_ext.cmp(a_ext)))
        .map(|(ext, _)| ext.clone());

    stats
}
