// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! `bapx settings`

use super::print_json;
use crate::cli::{OutputFormat, SettingsCommands};
use crate::config::Settings;
use crate::error::Result;

pub fn execute(
    settings: &Settings,
    command: Option<&SettingsCommands>,
    format: &OutputFormat,
) -> Result<()> {
    match command.unwrap_or(&SettingsCommands::Show) {
        SettingsCommands::Show => print_json(settings),
        SettingsCommands::Path => {
            let path = Settings::default_path();
            if matches!(format, OutputFormat::Json) {
                return print_json(&serde_json::json!({ "path": path.display().to_string() }));
            }
            println!("{}", path.display());
            Ok(())
        }
        SettingsCommands::Save => {
            let path = Settings::default_path();
            let saved = Settings::resave(&path)?;
            if matches!(format, OutputFormat::Json) {
                return print_json(&saved);
            }
            println!("Saved {}", path.display());
            Ok(())
        }
    }
}
