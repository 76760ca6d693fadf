// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Project-level validation log (`validation_log.json`)
//!
//! Keeps a bounded history of file validation results reported by the
//! host's syntax checker along with aggregate run statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::timestamp;

/// Validation records kept in history
pub const MAX_VALIDATION_HISTORY: usize = 100;

/// Tested file paths kept in `last_tested_files`
pub const MAX_TESTED_FILES: usize = 20;

/// Records and files returned in a summary
const SUMMARY_WINDOW: usize = 5;

/// Outcome of validating one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub file_path: String,
    pub overall_success: bool,
    #[serde(default)]
    pub details: Vec<String>,
    #[serde(default = "Utc::now", with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ValidationRecord {
    pub fn new(file_path: impl Into<String>, overall_success: bool) -> Self {
        Self {
            file_path: file_path.into(),
            overall_success,
            details: Vec::new(),
            timestamp: Utc::now(),
            extra: Map::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestStats {
    #[serde(default)]
    pub total_runs: u64,
    #[serde(default)]
    pub successful_runs: u64,
    #[serde(default)]
    pub failed_runs: u64,
}

/// Whole `validation_log.json` document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationLog {
    #[serde(default)]
    pub validation_history: Vec<ValidationRecord>,
    #[serde(default)]
    pub last_tested_files: Vec<String>,
    #[serde(default)]
    pub overall_success_rate: f64,
    #[serde(default)]
    pub test_stats: TestStats,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ValidationLog {
    /// Append a record, update statistics and trim both histories.
    pub fn record(&mut self, record: ValidationRecord) {
        self.test_stats.total_runs += 1;
        if record.overall_success {
            self.test_stats.successful_runs += 1;
        } else {
            self.test_stats.failed_runs += 1;
        }
        self.overall_success_rate =
            self.test_stats.successful_runs as f64 / self.test_stats.total_runs.max(1) as f64;

        self.last_tested_files.push(record.file_path.clone());
        self.validation_history.push(record);

        trim_front(&mut self.validation_history, MAX_VALIDATION_HISTORY);
        trim_front(&mut self.last_tested_files, MAX_TESTED_FILES);
    }

    pub fn summary(&self) -> ValidationSummary {
        ValidationSummary {
            success_rate: self.overall_success_rate,
            total_validations: self.test_stats.total_runs,
            successful_validations: self.test_stats.successful_runs,
            failed_validations: self.test_stats.failed_runs,
            recent_validations: tail(&self.validation_history, SUMMARY_WINDOW).to_vec(),
            last_tested_files: tail(&self.last_tested_files, SUMMARY_WINDOW).to_vec(),
        }
    }
}

/// Condensed view of the validation log
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationSummary {
    pub success_rate: f64,
    pub total_validations: u64,
    pub successful_validations: u64,
    pub failed_validations: u64,
    pub recent_validations: Vec<ValidationRecord>,
    pub last_tested_files: Vec<String>,
}

fn trim_front<T>(items: &mut Vec<T>, max: usize) {
    if items.len() > max {
        let excess = items.len() - max;
        items.drain(..excess);
    }
}

fn tail<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}
