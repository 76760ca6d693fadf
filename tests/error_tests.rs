// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::io;

use bapxcoder::error::BapxError;
use bapxcoder::utils::format_error;

#[test]
fn test_io_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
    let error: BapxError = io_error.into();

    match error {
        BapxError::Io(_) => {} // Expected
        _ => panic!("Expected Io error, got different error type"),
    }
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let error: BapxError = json_error.into();
    assert!(matches!(error, BapxError::Json(_)));
    assert!(error.is_recoverable());
}

#[test]
fn test_config_error_display() {
    let error = BapxError::Config("model.max_tokens must be greater than 0".to_string());
    assert_eq!(
        error.to_string(),
        "Configuration error: model.max_tokens must be greater than 0"
    );
}

#[test]
fn test_not_found_display() {
    let error = BapxError::NotFound("todo #4".to_string());
    assert_eq!(error.to_string(), "Not found: todo #4");
    assert!(!error.is_recoverable());
}

#[test]
fn test_corrupt_state_is_recoverable() {
    let error = BapxError::corrupt("/p/.bapXcoder/sessiontree.json", "EOF while parsing");
    assert!(error.is_recoverable());
    assert!(error.to_string().contains("sessiontree.json"));
}

#[test]
fn test_format_error_invalid_input() {
    let error = BapxError::InvalidInput("user id must not contain path separators".to_string());
    assert_eq!(
        format_error(&error),
        "Invalid input: user id must not contain path separators"
    );
}

#[test]
fn test_format_error_generic() {
    let error = BapxError::Generation("model server returned 500: boom".to_string());
    assert_eq!(
        format_error(&error),
        "Error: Generation error: model server returned 500: boom"
    );
}
