// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! File explorer commands: tree, read, write, create, rm, mkdir, search, stats, recent

use std::io::Read;

use super::print_json;
use crate::app::AppContext;
use crate::cli::{OutputFormat, SearchArgs, TreeArgs};
use crate::error::{BapxError, Result};
use crate::explorer::{OpOutcome, MISSING_FILE};
use crate::utils::format_size;

fn is_json(format: &OutputFormat) -> bool {
    matches!(format, OutputFormat::Json)
}

/// Print an outcome; a failed outcome becomes an error for the exit code.
fn finish(outcome: OpOutcome, done: &str, format: &OutputFormat) -> Result<()> {
    if is_json(format) {
        print_json(&outcome)?;
    } else if outcome.success {
        println!("{}", done);
    }

    match outcome.error {
        Some(error) if !outcome.success && error == MISSING_FILE => Err(BapxError::NotFound(error)),
        Some(error) if !outcome.success => Err(std::io::Error::other(error).into()),
        _ => Ok(()),
    }
}

pub fn tree(ctx: &AppContext, args: &TreeArgs, format: &OutputFormat) -> Result<()> {
    let explorer = ctx.explorer();
    let depth = args.depth.unwrap_or(ctx.settings().explorer.tree_depth);

    if is_json(format) {
        return print_json(&explorer.build_tree(depth));
    }

    println!("{}/", explorer.root().display());
    print!("{}", explorer.render_tree(depth));
    Ok(())
}

pub fn read(ctx: &AppContext, path: &str, format: &OutputFormat) -> Result<()> {
    let record = ctx.explorer().read_file(path);

    if is_json(format) {
        return print_json(&record);
    }

    match (record.content, record.error) {
        (Some(content), _) => {
            print!("{}", content);
            Ok(())
        }
        (None, Some(error)) => Err(BapxError::NotFound(format!("{}: {}", path, error))),
        (None, None) => Ok(()),
    }
}

pub fn write(ctx: &AppContext, path: &str, content: Option<&str>, format: &OutputFormat) -> Result<()> {
    let content = match content {
        Some(content) => content.to_string(),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let outcome = ctx.explorer().write_file(path, &content);
    finish(
        outcome,
        &format!("Wrote {} ({})", path, format_size(content.len() as u64)),
        format,
    )
}

pub fn create(ctx: &AppContext, path: &str, content: &str, format: &OutputFormat) -> Result<()> {
    let outcome = ctx.explorer().create_file(path, content);
    finish(outcome, &format!("Created {}", path), format)
}

pub fn remove(ctx: &AppContext, path: &str, format: &OutputFormat) -> Result<()> {
    let outcome = ctx.explorer().delete_file(path);
    finish(outcome, &format!("Deleted {}", path), format)
}

pub fn mkdir(ctx: &AppContext, path: &str, format: &OutputFormat) -> Result<()> {
    let outcome = ctx.explorer().create_directory(path);
    finish(outcome, &format!("Created directory {}", path), format)
}

pub fn search(ctx: &AppContext, args: &SearchArgs, format: &OutputFormat) -> Result<()> {
    let explorer = ctx.explorer();
    let extensions = (!args.extensions.is_empty()).then_some(args.extensions.as_slice());
    let hits = explorer.search(&args.query, extensions);

    if is_json(format) {
        return print_json(&hits);
    }

    if hits.is_empty() {
        println!("No matches for '{}'", args.query);
        return Ok(());
    }
    for hit in &hits {
        let lines = hit
            .line_numbers
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!("{} ({} matches) lines {}", hit.file, hit.match_count, lines);
    }
    Ok(())
}

pub fn stats(ctx: &AppContext, format: &OutputFormat) -> Result<()> {
    let stats = ctx.explorer().project_stats();

    if is_json(format) {
        return print_json(&stats);
    }

    println!("Files:       {}", stats.total_files);
    println!("Directories: {}", stats.total_directories);
    println!("Total size:  {}", format_size(stats.total_size_bytes));
    if let Some(ext) = &stats.most_common_extension {
        let label = if ext.is_empty() { "(none)" } else { ext };
        println!("Most common: {}", label);
    }
    if let Some(modified) = stats.last_modified_at {
        println!("Modified:    {}", modified.format("%Y-%m-%d %H:%M:%S"));
    }
    if !stats.file_types.is_empty() {
        println!("\nFile types:");
        let mut types: Vec<_> = stats.file_types.iter().collect();
        types.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (ext, count) in types {
            let label = if ext.is_empty() { "(none)" } else { ext.as_str() };
            println!("  {:<10} {}", label, count);
        }
    }
    Ok(())
}

pub fn recent(ctx: &AppContext, format: &OutputFormat) -> Result<()> {
    let recent = ctx.explorer().recent_files();

    if is_json(format) {
        return print_json(&recent);
    }

    if recent.is_empty() {
        println!("No recent files.");
    }
    for (i, file) in recent.iter().enumerate() {
        println!("{:>3}. {}", i + 1, file);
    }
    Ok(())
}
