// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Whole-document JSON reads and atomic writes
//!
//! Writes go to a uniquely named sibling temp file and are renamed into
//! place, so a reader never observes a half-written document even when
//! two writers race (the later rename wins).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::Value;

use crate::error::{BapxError, Result};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Read a JSON document.
///
/// `Ok(None)` when the file is absent, `CorruptState` when it exists but
/// does not parse, `Io` for any other read failure.
pub fn read_document(path: &Path) -> Result<Option<Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            return Err(BapxError::corrupt(path, e));
        }
        Err(e) => return Err(e.into()),
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| BapxError::corrupt(path, e))
}

/// Serialize `value` pretty-printed and atomically replace `path`.
pub fn write_document<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(value)?;
    let temp_path = temp_path_for(path);

    if let Err(e) = std::fs::write(&temp_path, content) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e.into());
    }
    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e.into());
    }

    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{}.{}.{}.tmp", name, std::process::id(), seq))
}

/// Per-key mutexes serializing read-modify-write cycles.
///
/// Keys are state directories, so one lock covers every document an owner has.
/// When disabled, `with_lock` runs the closure directly and concurrent writers
/// fall back to last-writer-wins.
pub struct KeyedLocks {
    enabled: bool,
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Run `f` while holding the lock for `key`.
    pub fn with_lock<T>(&self, key: &Path, f: impl FnOnce() -> T) -> T {
        if !self.enabled {
            return f();
        }

        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|poisoned| {
                tracing::warn!("Lock registry was poisoned, recovering");
                poisoned.into_inner()
            });
            locks
                .entry(normalize_key(key))
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f()
    }
}

fn normalize_key(key: &Path) -> PathBuf {
    // The state directory may not exist yet; canonicalize the nearest existing ancestor.
    let mut existing = key;
    let mut suffix = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                suffix.push(name.to_os_string());
                existing = parent;
            }
            _ => return key.to_path_buf(),
        }
    }

    let mut normalized = std::fs::canonicalize(existing).unwrap_or_else(|_| existing.to_path_buf());
    for part in suffix.into_iter().rev() {
        normalized.push(part);
    }
    normalized
}
