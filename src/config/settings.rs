// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for bapxcoder
//!
//! Handles loading and saving settings from ~/.bapxcoder/settings.json

use serde::{Deserialize, Serialize};

mod io;
mod migration;
mod validation;

/// Main settings structure, stored in ~/.bapxcoder/settings.json
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    /// File explorer behaviour
    #[serde(default)]
    pub explorer: ExplorerConfig,

    /// Local model server used by `chat`
    #[serde(default)]
    pub model: ModelConfig,

    /// Project state persistence
    #[serde(default)]
    pub store: StoreConfig,
}

/// File explorer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExplorerConfig {
    /// Default depth for project trees
    #[serde(default = "default_tree_depth")]
    pub tree_depth: usize,

    /// Extensions searched when the caller gives none
    #[serde(default = "default_search_extensions")]
    pub search_extensions: Vec<String>,

    /// Maximum number of files returned by a search
    #[serde(default = "default_max_search_results")]
    pub max_search_results: usize,

    /// Maximum matching line numbers reported per file
    #[serde(default = "default_max_line_numbers")]
    pub max_line_numbers: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            tree_depth: default_tree_depth(),
            search_extensions: default_search_extensions(),
            max_search_results: default_max_search_results(),
            max_line_numbers: default_max_line_numbers(),
        }
    }
}

/// Local model server configuration (Ollama-compatible `/api/generate`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// Base URL of the model server
    #[serde(default = "default_model_url")]
    pub base_url: String,

    /// Model name passed to the server
    #[serde(default = "default_model_name")]
    pub model: String,

    /// Token budget per generation
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_model_url(),
            model: default_model_name(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Serialize read-modify-write cycles per (project, user)
    #[serde(default = "default_lock_writes")]
    pub lock_writes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lock_writes: default_lock_writes(),
        }
    }
}

fn default_tree_depth() -> usize {
    3
}

pub(crate) fn default_search_extensions() -> Vec<String> {
    [
        ".py", ".js", ".ts", ".html", ".css", ".json", ".md", ".txt", ".java", ".cpp", ".c", ".go",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_search_results() -> usize {
    50
}

fn default_max_line_numbers() -> usize {
    10
}

fn default_model_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model_name() -> String {
    "qwen3-coder".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_lock_writes() -> bool {
    true
}
