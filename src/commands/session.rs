// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! `bapx session`

use std::io::{self, Write};

use crossterm::style::{Color, ResetColor, SetForegroundColor};
use crossterm::ExecutableCommand;

use super::print_json;
use crate::app::AppContext;
use crate::cli::{OutputFormat, SessionCommands};
use crate::continuity;
use crate::error::Result;

/// Print the continuity banner in color, if there is anything to resume.
pub fn print_banner(message: &str) -> Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(Color::Yellow))?;
    write!(stdout, "↻ ")?;
    stdout.execute(ResetColor)?;
    writeln!(stdout, "{}", message)?;
    Ok(())
}

pub fn execute(ctx: &AppContext, command: &SessionCommands, format: &OutputFormat) -> Result<()> {
    let store = ctx.store();
    let project = ctx.project_root();
    let user = ctx.user_id();
    let json = matches!(format, OutputFormat::Json);

    match command {
        SessionCommands::Show => {
            let tree = store.get_session_tree(project, user)?;
            if json {
                return print_json(&tree);
            }
            println!("Project:       {}", tree.project_path);
            println!("Sessions:      {}", tree.session_count);
            if let Some(last) = tree.last_activity {
                println!("Last activity: {}", last.format("%Y-%m-%d %H:%M:%S"));
            }
            if let Some(task) = &tree.last_task {
                println!("Last task:     {}", task);
            }
            if let Some(action) = &tree.last_action {
                println!("Last action:   {}", action);
            }
            if let Some(command) = &tree.last_command {
                println!("Last command:  {}", command);
            }
            if !tree.active_files.is_empty() {
                println!("Active files:");
                for file in &tree.active_files {
                    println!("  {}", file);
                }
            }
        }
        SessionCommands::Resume => {
            let summary = continuity::load_summary(store, project, user);
            if json {
                return print_json(&serde_json::json!({
                    "message": summary.as_ref().map(|s| s.message()),
                    "summary": summary,
                }));
            }
            match summary {
                Some(summary) => print_banner(&summary.message())?,
                None => println!("Nothing to resume."),
            }
        }
        SessionCommands::Begin => {
            let tree = store.begin_session(project, user)?;
            if json {
                return print_json(&tree);
            }
            println!("Session {} started", tree.session_count);
        }
        SessionCommands::Release { path } => {
            let released = store.release_file(project, user, path)?;
            if json {
                return print_json(&serde_json::json!({ "released": released }));
            }
            if released {
                println!("Released {}", path);
            } else {
                println!("{} was not active", path);
            }
        }
        SessionCommands::Command { command } => {
            let command = command.join(" ");
            store.record_command(project, user, &command)?;
            if !json {
                println!("Recorded: {}", command);
            } else {
                print_json(&serde_json::json!({ "last_command": command }))?;
            }
        }
    }

    Ok(())
}
