// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! `bapx todo`

use super::print_json;
use crate::app::AppContext;
use crate::cli::{OutputFormat, TodoCommands};
use crate::error::{BapxError, Result};
use crate::store::TodoItem;

/// Convert a 1-based CLI number into a list index.
fn to_index(number: usize) -> Result<usize> {
    number
        .checked_sub(1)
        .ok_or_else(|| BapxError::InvalidInput("todo numbers start at 1".to_string()))
}

fn format_todo(number: usize, item: &TodoItem) -> String {
    let mark = if item.completed { "x" } else { " " };
    format!(
        "{:>3}. [{}] {}  ({})",
        number,
        mark,
        item.text,
        item.created_at.format("%Y-%m-%d %H:%M")
    )
}

pub fn execute(ctx: &AppContext, command: &TodoCommands, format: &OutputFormat) -> Result<()> {
    let store = ctx.store();
    let project = ctx.project_root();
    let user = ctx.user_id();
    let json = matches!(format, OutputFormat::Json);

    match command {
        TodoCommands::Add { text } => {
            let item = store.add_todo(project, user, &text.join(" "))?;
            if json {
                return print_json(&item);
            }
            println!("Added: {}", item.text);
        }
        TodoCommands::List { pending } => {
            let todos = store.get_todos(project, user)?;
            let shown: Vec<(usize, &TodoItem)> = todos
                .iter()
                .enumerate()
                .map(|(i, item)| (i + 1, item))
                .filter(|(_, item)| !*pending || item.is_pending())
                .collect();

            if json {
                let items: Vec<&TodoItem> = shown.iter().map(|(_, item)| *item).collect();
                return print_json(&items);
            }
            if shown.is_empty() {
                println!("No todos.");
            }
            for (number, item) in shown {
                println!("{}", format_todo(number, item));
            }
        }
        TodoCommands::Remove { index } => {
            let removed = store.remove_todo(project, user, to_index(*index)?)?;
            report(json, removed, &format!("Removed todo {}", index), *index)?;
        }
        TodoCommands::Done { index } => {
            let changed = store.set_todo_completed(project, user, to_index(*index)?, true)?;
            report(json, changed, &format!("Completed todo {}", index), *index)?;
        }
        TodoCommands::Undo { index } => {
            let changed = store.set_todo_completed(project, user, to_index(*index)?, false)?;
            report(json, changed, &format!("Reopened todo {}", index), *index)?;
        }
    }

    Ok(())
}

fn report(json: bool, success: bool, message: &str, number: usize) -> Result<()> {
    if json {
        return print_json(&serde_json::json!({ "success": success }));
    }
    if success {
        println!("{}", message);
    } else {
        println!("No todo numbered {}", number);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_index() {
        assert_eq!(to_index(1).unwrap(), 0);
        assert!(to_index(0).is_err());
    }

    #[test]
    fn test_format_todo() {
        let mut item = TodoItem::new("ship it", None);
        assert!(format_todo(1, &item).starts_with("  1. [ ] ship it"));
        item.completed = true;
        assert!(format_todo(12, &item).starts_with(" 12. [x] ship it"));
    }
}
