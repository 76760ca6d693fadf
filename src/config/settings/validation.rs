// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crate::error::{BapxError, Result};

use super::Settings;

impl Settings {
    /// Reject values the rest of the crate cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.model.max_tokens == 0 {
            return Err(BapxError::Config(
                "model.max_tokens must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(BapxError::Config(format!(
                "model.temperature must be between 0.0 and 2.0, got {}",
                self.model.temperature
            )));
        }
        if self.explorer.tree_depth == 0 {
            return Err(BapxError::Config(
                "explorer.tree_depth must be at least 1".to_string(),
            ));
        }
        if self.explorer.max_search_results == 0 {
            return Err(BapxError::Config(
                "explorer.max_search_results must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply `BAPX_MODEL_URL` / `BAPX_MODEL` on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        // Priority: env var > config file.
        if let Ok(url) = std::env::var("BAPX_MODEL_URL") {
            if !url.trim().is_empty() {
                self.model.base_url = url;
            }
        }
        if let Ok(model) = std::env::var("BAPX_MODEL") {
            if !model.trim().is_empty() {
                self.model.model = model;
            }
        }
    }
}
