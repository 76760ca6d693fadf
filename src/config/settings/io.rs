// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::path::{Path, PathBuf};

use crate::error::Result;

use super::migration;
use super::Settings;

impl Settings {
    /// Get the default settings file path.
    pub fn default_path() -> PathBuf {
        Self::bapx_home().join("settings.json")
    }

    /// Load settings from the default path, then apply env overrides.
    pub fn load() -> Result<Self> {
        let mut settings = Self::load_from(&Self::default_path())?;
        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Load settings from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let raw_value: serde_json::Value = serde_json::from_str(&content)?;
        let migrated = migration::migrate_on_load(raw_value);
        let settings: Settings = serde_json::from_value(migrated)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rewrite the file at `path` with its own values filled out to the current
    /// schema. Environment overrides are not applied, so they never end up on disk.
    pub fn resave(path: &Path) -> Result<Self> {
        let settings = Self::load_from(path)?;
        settings.save_to(path)?;
        Ok(settings)
    }

    /// Save settings to a specific path, merging with existing file content
    /// to preserve unknown keys from other versions or hand edits.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let new_value = serde_json::to_value(self)?;

        let merged = if path.exists() {
            let existing_content = std::fs::read_to_string(path)?;
            match serde_json::from_str::<serde_json::Value>(&existing_content) {
                Ok(existing_value) => migration::deep_merge(existing_value, new_value),
                Err(_) => new_value, // Corrupt file, overwrite entirely.
            }
        } else {
            new_value
        };

        let content = serde_json::to_string_pretty(&merged)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the bapxcoder home directory (~/.bapxcoder or $BAPX_HOME).
    pub fn bapx_home() -> PathBuf {
        if let Ok(home) = std::env::var("BAPX_HOME") {
            return PathBuf::from(home);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".bapxcoder")
    }

    /// Ensure the home directory exists.
    pub fn ensure_directories() -> Result<()> {
        let home = Self::bapx_home();
        if !home.exists() {
            std::fs::create_dir_all(&home)?;
        }
        Ok(())
    }
}
