// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Case-insensitive text search across project files

use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use walkdir::WalkDir;

use super::encoding::decode_with_fallback;
use super::tree::relative_key;
use crate::store::CONTROL_DIR;

/// A file containing the query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub file: String,
    pub match_count: usize,
    pub line_numbers: Vec<usize>,
}

/// Limits applied to a search
#[derive(Debug, Clone, Copy)]
pub struct SearchLimits {
    pub max_results: usize,
    pub max_line_numbers: usize,
}

/// Build the file-name patterns (`*{ext}`) for a set of extensions.
fn extension_patterns(extensions: &[String]) -> Vec<glob::Pattern> {
    extensions
        .iter()
        .filter_map(|ext| match glob::Pattern::new(&format!("*{}", ext)) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                tracing::warn!("Ignoring invalid extension filter '{}': {}", ext, e);
                None
            }
        })
        .collect()
}

fn literal_matcher(query: &str) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
        .map_err(|e| tracing::warn!("Cannot build matcher for '{}': {}", query, e))
        .ok()
}

/// Search files under `root` whose name ends in one of `extensions`.
///
/// The control directory is never searched. Lines are counted from 1.
pub fn search_project(
    root: &Path,
    query: &str,
    extensions: &[String],
    limits: SearchLimits,
) -> Vec<SearchHit> {
    if query.is_empty() {
        return Vec::new();
    }

    let Some(matcher) = literal_matcher(query) else {
        return Vec::new();
    };
    let patterns = extension_patterns(extensions);
    let mut hits = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != CONTROL_DIR);

    for entry in walker.filter_map(|e| e.ok()) {
        if hits.len() >= limits.max_results {
            tracing::debug!("Search for '{}' capped at {} files", query, limits.max_results);
            break;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !patterns.iter().any(|p| p.matches(&name)) {
            continue;
        }

        let Ok(bytes) = std::fs::read(entry.path()) else {
            continue;
        };
        let Some((content, _)) = decode_with_fallback(&bytes) else {
            continue;
        };

        let line_numbers: Vec<usize> = content
            .split('\n')
            .enumerate()
            .filter(|(_, line)| matcher.is_match(line))
            .map(|(i, _)| i + 1)
            .collect();

        if line_numbers.is_empty() {
            continue;
        }

        hits.push(SearchHit {
            file: relative_key(root, entry.path()),
            match_count: line_numbers.len(),
            line_numbers: line_numbers
                .into_iter()
                .take(limits.max_line_numbers)
                .collect(),
        });
    }

    hits
}
