// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! `bapx validation`

use super::print_json;
use crate::app::AppContext;
use crate::cli::{OutputFormat, ValidationCommands};
use crate::error::Result;
use crate::store::{ValidationRecord, ValidationSummary};

fn print_summary(summary: &ValidationSummary) {
    println!(
        "Success rate: {:.1}% ({} of {} passed, {} failed)",
        summary.success_rate * 100.0,
        summary.successful_validations,
        summary.total_validations,
        summary.failed_validations
    );

    if !summary.recent_validations.is_empty() {
        println!("\nRecent:");
        for record in &summary.recent_validations {
            let mark = if record.overall_success { "✓" } else { "✗" };
            println!(
                "  {} {}  {}",
                mark,
                record.file_path,
                record.timestamp.format("%Y-%m-%d %H:%M")
            );
            for detail in &record.details {
                println!("      {}", detail);
            }
        }
    }
}

pub fn execute(ctx: &AppContext, command: &ValidationCommands, format: &OutputFormat) -> Result<()> {
    let summary = match command {
        ValidationCommands::Record {
            file,
            failed,
            detail,
        } => {
            let record = ValidationRecord::new(file, !failed).with_details(detail.clone());
            ctx.store().record_validation(ctx.project_root(), record)?
        }
        ValidationCommands::Summary => ctx.store().validation_summary(ctx.project_root())?,
    };

    if matches!(format, OutputFormat::Json) {
        return print_json(&summary);
    }
    print_summary(&summary);
    Ok(())
}
