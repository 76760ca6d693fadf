// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Command handlers for the `bapx` binary
//!
//! Each handler takes the `AppContext` built in `main` and the requested
//! output format. JSON output is pretty-printed to stdout.

pub mod chat;
pub mod files;
pub mod session;
pub mod settings;
pub mod todo;
pub mod validation;

use serde::Serialize;

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::error::Result;

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Create the control directory for the current project
pub fn init(ctx: &AppContext, format: &OutputFormat) -> Result<()> {
    let control = ctx.store().ensure_project(ctx.project_root())?;

    if matches!(format, OutputFormat::Json) {
        return print_json(&serde_json::json!({
            "control_dir": control.path().display().to_string(),
        }));
    }

    println!("Initialized {}", control.path().display());
    Ok(())
}
