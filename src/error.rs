// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for bapxcoder
//!
//! Persistence code recovers from `CorruptState` internally; explorer
//! operations convert `NotFound`/`Decode` into soft outcomes. Only the
//! variants that a caller can act on are expected to cross module edges.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for bapxcoder operations
#[derive(Error, Debug)]
pub enum BapxError {
    /// IO errors (cannot create/read/write a file or directory)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A state document exists but could not be parsed
    #[error("Corrupt state in {}: {reason}", path.display())]
    CorruptState { path: PathBuf, reason: String },

    /// File or index does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// No encoding in the fallback chain could decode the file
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The text-generation capability failed
    #[error("Generation error: {0}")]
    Generation(String),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl BapxError {
    /// Build a `CorruptState` error for a document path
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        BapxError::CorruptState {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error is recovered internally rather than surfaced
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BapxError::CorruptState { .. } | BapxError::Json(_))
    }
}

/// Result type alias for bapxcoder operations
pub type Result<T> = std::result::Result<T, BapxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_state_display() {
        let err = BapxError::corrupt("/p/.bapXcoder/todo.json", "expected value at line 1");
        let msg = err.to_string();
        assert!(msg.contains("Corrupt state"));
        assert!(msg.contains("todo.json"));
        assert!(msg.contains("expected value"));
    }

    #[test]
    fn test_not_found_display() {
        let err = BapxError::NotFound("File does not exist".to_string());
        assert_eq!(err.to_string(), "Not found: File does not exist");
    }

    #[test]
    fn test_decode_display() {
        let err = BapxError::Decode("Could not decode file".to_string());
        assert!(err.to_string().contains("Could not decode file"));
    }

    #[test]
    fn test_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: BapxError = io_err.into();
        assert!(matches!(err, BapxError::Io(_)));
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: BapxError = json_err.into();
        assert!(matches!(err, BapxError::Json(_)));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(BapxError::corrupt("x", "y").is_recoverable());
        assert!(!BapxError::InvalidInput("x".into()).is_recoverable());
        assert!(!BapxError::Io(std::io::Error::other("x")).is_recoverable());
    }

    #[test]
    fn test_result_type_alias() {
        fn test_fn() -> Result<i32> {
            Ok(42)
        }

        assert_eq!(test_fn().unwrap(), 42);
    }
}
