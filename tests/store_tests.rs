// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::sync::Arc;
use std::thread;

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use tempfile::TempDir;

use bapxcoder::error::BapxError;
use bapxcoder::store::{ProjectStore, ValidationRecord, CONTROL_DIR, MAX_RECENT_FILES};

fn raw_document(path: std::path::PathBuf) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_user_state_is_isolated() {
    let temp_dir = TempDir::new().unwrap();
    let store = ProjectStore::new();
    let project = temp_dir.path();

    store.add_todo(project, Some("alice"), "alice task").unwrap();
    store.add_todo(project, Some("bob"), "bob task").unwrap();
    store.add_todo(project, None, "legacy task").unwrap();

    let alice = store.get_todos(project, Some("alice")).unwrap();
    let bob = store.get_todos(project, Some("bob")).unwrap();
    let legacy = store.get_todos(project, None).unwrap();

    assert_eq!(alice.len(), 1);
    assert_eq!(alice[0].text, "alice task");
    assert_eq!(alice[0].user_id.as_deref(), Some("alice"));
    assert_eq!(bob[0].text, "bob task");
    assert_eq!(legacy[0].text, "legacy task");
    assert!(legacy[0].user_id.is_none());

    let control = project.join(CONTROL_DIR);
    assert!(control.join("users").join("alice").join("todo.json").is_file());
    assert!(control.join("todo.json").is_file());
}

#[test]
fn test_invalid_user_id_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let store = ProjectStore::new();

    for bad in ["", "..", "a/b", "a\\b"] {
        let err = store.get_todos(temp_dir.path(), Some(bad)).unwrap_err();
        assert!(matches!(err, BapxError::InvalidInput(_)), "{:?}", bad);
    }
}

#[test]
fn test_todo_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let store = ProjectStore::new();
    let project = temp_dir.path();

    store.add_todo(project, None, "one").unwrap();
    store.add_todo(project, None, "two").unwrap();
    store.add_todo(project, None, "three").unwrap();

    assert!(store.set_todo_completed(project, None, 1, true).unwrap());
    assert!(store.remove_todo(project, None, 0).unwrap());
    assert!(!store.remove_todo(project, None, 9).unwrap());

    let todos = store.get_todos(project, None).unwrap();
    let texts: Vec<_> = todos.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["two", "three"]);
    assert!(todos[0].completed);
    assert!(!todos[1].completed);

    // The session tree mirrors the list.
    let tree = store.get_session_tree(project, None).unwrap();
    assert_eq!(tree.todos, todos);
}

#[test]
fn test_blank_todo_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let store = ProjectStore::new();
    let err = store.add_todo(temp_dir.path(), None, "   ").unwrap_err();
    assert!(matches!(err, BapxError::InvalidInput(_)));
}

#[test]
fn test_corrupt_todo_file_reads_as_empty_and_is_replaced() {
    let temp_dir = TempDir::new().unwrap();
    let store = ProjectStore::new();
    let project = temp_dir.path();
    let control = project.join(CONTROL_DIR);
    std::fs::create_dir_all(&control).unwrap();
    std::fs::write(control.join("todo.json"), "{ truncated").unwrap();

    assert!(store.get_todos(project, None).unwrap().is_empty());

    store.add_todo(project, None, "fresh").unwrap();
    let todos = store.get_todos(project, None).unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].text, "fresh");
}

#[test]
fn test_legacy_item_key_is_read() {
    let temp_dir = TempDir::new().unwrap();
    let store = ProjectStore::new();
    let control = temp_dir.path().join(CONTROL_DIR);
    std::fs::create_dir_all(&control).unwrap();
    std::fs::write(
        control.join("todo.json"),
        r#"[{"item": "old style", "timestamp": "2024-05-01T10:00:00", "completed": false}]"#,
    )
    .unwrap();

    let todos = store.get_todos(temp_dir.path(), None).unwrap();
    assert_eq!(todos[0].text, "old style");
}

#[test]
fn test_update_session_tree_preserves_unknown_keys() {
    let temp_dir = TempDir::new().unwrap();
    let store = ProjectStore::new();
    let project = temp_dir.path();
    let control = project.join(CONTROL_DIR);
    std::fs::create_dir_all(&control).unwrap();
    std::fs::write(
        control.join("sessiontree.json"),
        r#"{"project_path": "/elsewhere", "editor_layout": {"split": "vertical"}, "session_count": 4}"#,
    )
    .unwrap();

    let mut fields = Map::new();
    fields.insert("last_task".to_string(), json!("refactor auth"));
    store.update_session_tree(project, None, fields).unwrap();

    let raw = raw_document(control.join("sessiontree.json"));
    assert_eq!(raw["editor_layout"]["split"], "vertical");
    assert_eq!(raw["session_count"], 4);
    assert_eq!(raw["last_task"], "refactor auth");
    assert!(raw["last_activity"].is_string());

    let tree = store.get_session_tree(project, None).unwrap();
    assert_eq!(tree.last_task.as_deref(), Some("refactor auth"));
    assert_eq!(tree.session_count, 4);
}

#[test]
fn test_tree_field_of_unknown_shape_does_not_wipe_state() {
    let temp_dir = TempDir::new().unwrap();
    let store = ProjectStore::new();
    let project = temp_dir.path();

    store.begin_session(project, None).unwrap();
    store.begin_session(project, None).unwrap();
    store.add_todo(project, None, "keep me").unwrap();
    store.record_file_access(project, None, "a.py", 1).unwrap();

    let mut fields = Map::new();
    fields.insert("last_task".to_string(), json!({"title": "refactor"}));
    store.update_session_tree(project, None, fields).unwrap();
    store.record_file_access(project, None, "b.py", 2).unwrap();

    let tree = store.get_session_tree(project, None).unwrap();
    assert_eq!(tree.session_count, 2);
    assert_eq!(tree.recent_files, vec!["b.py", "a.py"]);
    assert_eq!(tree.todos.len(), 1);
    assert_eq!(tree.todos[0].text, "keep me");
    assert!(tree.last_task.is_none());

    let raw = raw_document(project.join(CONTROL_DIR).join("sessiontree.json"));
    assert_eq!(raw["last_task"], json!({"title": "refactor"}));
    assert_eq!(raw["session_count"], 2);
}

#[test]
fn test_todo_with_null_timestamp_survives_add() {
    let temp_dir = TempDir::new().unwrap();
    let store = ProjectStore::new();
    let project = temp_dir.path();
    let control = project.join(CONTROL_DIR);
    std::fs::create_dir_all(&control).unwrap();
    std::fs::write(
        control.join("todo.json"),
        r#"[{"item": "old task", "timestamp": null, "completed": false}]"#,
    )
    .unwrap();

    assert_eq!(store.get_todos(project, None).unwrap().len(), 1);
    store.add_todo(project, None, "new").unwrap();

    let raw = raw_document(control.join("todo.json"));
    let texts: Vec<_> = raw
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["text"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(texts, vec!["old task", "new"]);
    assert!(raw[0]["timestamp"].is_string());
}

#[test]
fn test_record_file_access_and_release() {
    let temp_dir = TempDir::new().unwrap();
    let store = ProjectStore::new();
    let project = temp_dir.path();

    store.record_file_access(project, None, "src/a.py", 120).unwrap();
    store.record_file_access(project, None, "src/b.py", 40).unwrap();

    let tree = store.get_session_tree(project, None).unwrap();
    assert_eq!(tree.recent_files, vec!["src/b.py", "src/a.py"]);
    assert!(tree.active_files.contains("src/a.py"));
    assert_eq!(tree.file_stats["src/a.py"].size, 120);

    assert!(store.release_file(project, None, "src/a.py").unwrap());
    assert!(!store.release_file(project, None, "src/a.py").unwrap());
    let tree = store.get_session_tree(project, None).unwrap();
    assert!(!tree.active_files.contains("src/a.py"));
    assert_eq!(tree.recent_files.len(), 2);
}

#[test]
fn test_recent_files_capped() {
    let temp_dir = TempDir::new().unwrap();
    let store = ProjectStore::new();
    let project = temp_dir.path();

    for i in 0..11 {
        store
            .record_file_access(project, None, &format!("f{}.txt", i), 1)
            .unwrap();
    }

    let recent = store.recent_files(project, None).unwrap();
    assert_eq!(recent.len(), MAX_RECENT_FILES);
    assert_eq!(recent[0], "f10.txt");
    assert!(!recent.contains(&"f0.txt".to_string()));
}

#[test]
fn test_begin_session_and_record_command() {
    let temp_dir = TempDir::new().unwrap();
    let store = ProjectStore::new();
    let project = temp_dir.path();

    store.begin_session(project, Some("u1")).unwrap();
    let tree = store.begin_session(project, Some("u1")).unwrap();
    assert_eq!(tree.session_count, 2);
    assert!(tree.last_session.is_some());

    store.record_command(project, Some("u1"), "cargo test").unwrap();
    let tree = store.get_session_tree(project, Some("u1")).unwrap();
    assert_eq!(tree.last_command.as_deref(), Some("cargo test"));
    assert!(tree.last_command_time.is_some());
}

#[test]
fn test_snapshot_of_fresh_project_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let store = ProjectStore::new();

    let snapshot = store.snapshot(temp_dir.path(), Some("new-user")).unwrap();
    assert!(snapshot.is_empty());
    assert!(!temp_dir.path().join(CONTROL_DIR).exists());
}

#[test]
fn test_validation_log_summary() {
    let temp_dir = TempDir::new().unwrap();
    let store = ProjectStore::new();
    let project = temp_dir.path();

    store
        .record_validation(project, ValidationRecord::new("a.py", true))
        .unwrap();
    store
        .record_validation(project, ValidationRecord::new("b.py", true))
        .unwrap();
    let summary = store
        .record_validation(
            project,
            ValidationRecord::new("c.py", false).with_details(vec!["E501".to_string()]),
        )
        .unwrap();

    assert_eq!(summary.total_validations, 3);
    assert_eq!(summary.successful_validations, 2);
    assert_eq!(summary.failed_validations, 1);
    assert!((summary.success_rate - 2.0 / 3.0).abs() < 1e-9);

    let reread = store.validation_summary(project).unwrap();
    assert_eq!(reread.total_validations, 3);
}

#[test]
fn test_concurrent_add_todo_keeps_every_item() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(ProjectStore::with_locking(true));
    let project = temp_dir.path().to_path_buf();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            let project = project.clone();
            thread::spawn(move || {
                for i in 0..10 {
                    store
                        .add_todo(&project, Some("shared"), &format!("t{}-{}", t, i))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let todos = store.get_todos(&project, Some("shared")).unwrap();
    assert_eq!(todos.len(), 80);
}

#[test]
fn test_concurrent_writes_without_locking_never_corrupt() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(ProjectStore::with_locking(false));
    let project = temp_dir.path().to_path_buf();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = Arc::clone(&store);
            let project = project.clone();
            thread::spawn(move || {
                for i in 0..10 {
                    store
                        .add_todo(&project, None, &format!("t{}-{}", t, i))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Updates may be lost, but the document is always complete JSON.
    let raw = raw_document(project.join(CONTROL_DIR).join("todo.json"));
    let items = raw.as_array().unwrap();
    assert!(!items.is_empty() && items.len() <= 40);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_recent_files_move_to_front(accesses in proptest::collection::vec(0usize..15, 1..30)) {
        let temp_dir = TempDir::new().unwrap();
        let store = ProjectStore::new();
        let project = temp_dir.path();

        for n in &accesses {
            store.record_file_access(project, None, &format!("file{}.rs", n), 1).unwrap();
        }

        let recent = store.recent_files(project, None).unwrap();
        let last = format!("file{}.rs", accesses[accesses.len() - 1]);

        prop_assert_eq!(&recent[0], &last);
        prop_assert!(recent.len() <= MAX_RECENT_FILES);

        let mut deduped = recent.clone();
        deduped.sort();
        deduped.dedup();
        prop_assert_eq!(deduped.len(), recent.len());

        // Order follows the most recent access of each file.
        let mut expected = Vec::new();
        for n in accesses.iter().rev() {
            let name = format!("file{}.rs", n);
            if !expected.contains(&name) {
                expected.push(name);
            }
        }
        expected.truncate(MAX_RECENT_FILES);
        prop_assert_eq!(recent, expected);
    }
}
