// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use bapxcoder::explorer::{FileExplorer, TreeNode, MISSING_FILE};
use bapxcoder::store::{ProjectStore, CONTROL_DIR};

fn explorer(temp_dir: &TempDir) -> FileExplorer {
    FileExplorer::new(temp_dir.path(), Arc::new(ProjectStore::new()), None)
}

fn sample_project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("src/utils")).unwrap();
    fs::write(root.join("README.md"), "# Demo\nSee main.py\n").unwrap();
    fs::write(root.join("src/main.py"), "import os\n\ndef main():\n    pass\n").unwrap();
    fs::write(root.join("src/utils/helpers.py"), "def helper():\n    return 1\n").unwrap();
    fs::write(root.join(".env"), "SECRET=1\n").unwrap();
    temp_dir
}

#[test]
fn test_tree_depth_limits_and_hidden_entries() {
    let temp_dir = sample_project();
    let explorer = explorer(&temp_dir);

    let tree = explorer.build_tree(2);
    assert!(tree.contains_key("README.md"));
    assert!(!tree.contains_key(".env"));

    match &tree["src"] {
        TreeNode::Directory { children, .. } => {
            assert!(children.contains_key("src/main.py"));
            match &children["src/utils"] {
                TreeNode::Directory { children, .. } => assert!(children.is_empty()),
                other => panic!("Expected directory, got {:?}", other),
            }
        }
        other => panic!("Expected directory, got {:?}", other),
    }

    assert!(explorer.build_tree(0).is_empty());
}

#[test]
fn test_rendered_tree_lists_directories_first() {
    let temp_dir = sample_project();
    let explorer = explorer(&temp_dir);
    let rendered = explorer.render_tree(3);

    let src = rendered.find("src").unwrap();
    let readme = rendered.find("README.md").unwrap();
    assert!(src < readme);
    assert!(rendered.contains("└── "));
    assert!(rendered.contains("helpers.py"));
    assert!(!explorer.render_tree(1).contains("main.py"));
}

#[test]
fn test_read_write_roundtrip_records_access() {
    let temp_dir = sample_project();
    let explorer = explorer(&temp_dir);

    let outcome = explorer.write_file("docs/notes/todo.md", "- ship it\n");
    assert!(outcome.success);
    assert!(temp_dir.path().join("docs/notes/todo.md").is_file());

    let record = explorer.read_file("docs/notes/todo.md");
    assert_eq!(record.content.as_deref(), Some("- ship it\n"));
    assert!(record.error.is_none());
    assert_eq!(record.encoding.as_deref(), Some("utf-8"));

    let recent = explorer.recent_files();
    assert_eq!(recent, vec!["docs/notes/todo.md"]);
}

#[test]
fn test_read_latin1_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("legacy.txt"), b"caf\xe9\n").unwrap();

    let record = explorer(&temp_dir).read_file("legacy.txt");
    assert_eq!(record.content.as_deref(), Some("café\n"));
    assert!(record.encoding.is_some());
}

#[test]
fn test_read_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let record = explorer(&temp_dir).read_file("nope.txt");
    assert!(record.content.is_none());
    assert_eq!(record.error.as_deref(), Some(MISSING_FILE));
}

#[test]
fn test_paths_outside_root_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let explorer = explorer(&temp_dir);

    assert!(!explorer.write_file("../escape.txt", "x").success);
    assert!(!explorer.read_file("/etc/hostname").is_ok());
    assert!(!explorer.delete_file("a/../../b").success);
    assert!(!temp_dir.path().parent().unwrap().join("escape.txt").exists());
}

#[test]
fn test_delete_and_create_directory() {
    let temp_dir = sample_project();
    let explorer = explorer(&temp_dir);

    assert!(explorer.delete_file("README.md").success);
    assert!(!temp_dir.path().join("README.md").exists());

    let outcome = explorer.delete_file("README.md");
    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some(MISSING_FILE));

    assert!(explorer.create_directory("build/out").success);
    assert!(explorer.create_directory("build/out").success);
    assert!(temp_dir.path().join("build/out").is_dir());
}

#[test]
fn test_search_case_insensitive_with_line_numbers() {
    let temp_dir = sample_project();
    let explorer = explorer(&temp_dir);

    let hits = explorer.search("DEF", None);
    let files: Vec<_> = hits.iter().map(|h| h.file.as_str()).collect();
    assert_eq!(files, vec!["src/main.py", "src/utils/helpers.py"]);
    assert_eq!(hits[0].line_numbers, vec![3]);
    assert_eq!(hits[0].match_count, 1);

    let md_only = explorer.search("main.py", Some(&[".md".to_string()][..]));
    assert_eq!(md_only.len(), 1);
    assert_eq!(md_only[0].file, "README.md");

    assert!(explorer.search("", None).is_empty());
}

#[test]
fn test_search_skips_control_directory() {
    let temp_dir = sample_project();
    let explorer = explorer(&temp_dir);
    explorer.read_file("src/main.py");
    assert!(temp_dir.path().join(CONTROL_DIR).exists());

    let hits = explorer.search("main.py", Some(&[".json".to_string()][..]));
    assert!(hits.is_empty());
}

#[test]
fn test_project_stats() {
    let temp_dir = sample_project();
    let stats = explorer(&temp_dir).project_stats();

    assert_eq!(stats.file_types.get(".py"), Some(&2));
    assert_eq!(stats.most_common_extension.as_deref(), Some(".py"));
    assert!(stats.total_directories >= 2);
    assert!(stats.total_size_bytes > 0);
    assert!(stats.last_modified_at.is_some());
}

#[test]
fn test_search_filters_by_extension() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("a.py"),
        "x = 1\nfoo()\ny = 2\nz = 3\nFOO = foo\n",
    )
    .unwrap();
    fs::write(temp_dir.path().join("b.txt"), "foo\n").unwrap();

    let hits = explorer(&temp_dir).search("foo", Some(&[".py".to_string()][..]));

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].file, "a.py");
    assert_eq!(hits[0].match_count, 2);
    assert_eq!(hits[0].line_numbers, vec![2, 5]);
}
