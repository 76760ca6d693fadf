// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap
//!
//! Defines all command-line arguments and subcommands for bapx.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// bapx - project memory for the bapXcoder IDE
#[derive(Parser, Debug)]
#[command(name = "bapx")]
#[command(version, about = "Project-local session state, todos and file tools")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Project directory (defaults to the detected project root)
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// User whose state to use (omit for single-user mode)
    #[arg(long, global = true, env = "BAPX_USER")]
    pub user: Option<String>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the .bapXcoder control directory
    Init,

    /// Manage the todo list
    Todo(TodoArgs),

    /// Inspect or update session state
    Session(SessionArgs),

    /// Show the project tree
    Tree(TreeArgs),

    /// Print a file
    Read {
        /// Path relative to the project root
        path: String,
    },

    /// Write a file (content from --content or stdin)
    Write {
        path: String,

        #[arg(long)]
        content: Option<String>,
    },

    /// Create a file
    Create {
        path: String,

        /// Initial content
        #[arg(long, default_value = "")]
        content: String,
    },

    /// Delete a file
    Rm { path: String },

    /// Create a directory (and parents)
    Mkdir { path: String },

    /// Search file contents
    Search(SearchArgs),

    /// Show project statistics
    Stats,

    /// List recently accessed files
    Recent,

    /// Send one message to the model and record the exchange
    Chat(ChatArgs),

    /// Validation log
    Validation(ValidationArgs),

    /// Show configuration
    #[command(alias = "config")]
    Settings(SettingsArgs),
}

#[derive(clap::Args, Debug)]
pub struct TodoArgs {
    #[command(subcommand)]
    pub command: TodoCommands,
}

/// Todo indices are 1-based as printed by `todo list`
#[derive(Subcommand, Debug)]
pub enum TodoCommands {
    /// Add a todo
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// List todos
    #[command(alias = "ls")]
    List {
        /// Only show pending items
        #[arg(long)]
        pending: bool,
    },

    /// Remove a todo by number
    Remove { index: usize },

    /// Mark a todo as completed
    Done { index: usize },

    /// Mark a todo as pending again
    Undo { index: usize },
}

#[derive(clap::Args, Debug)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommands,
}

#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// Print the raw session tree
    Show,

    /// Print the continuity summary for this user
    Resume,

    /// Count a new session
    Begin,

    /// Mark a file as no longer active
    Release { path: String },

    /// Record the last terminal command
    Command {
        #[arg(required = true, num_args = 1..)]
        command: Vec<String>,
    },
}

#[derive(clap::Args, Debug)]
pub struct TreeArgs {
    /// Depth limit (defaults to settings)
    #[arg(short, long)]
    pub depth: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    pub query: String,

    /// Extensions to search, e.g. `-e .py -e .rs` (defaults to settings)
    #[arg(short, long = "ext")]
    pub extensions: Vec<String>,
}

#[derive(clap::Args, Debug, Default)]
pub struct ChatArgs {
    /// Message text
    #[arg(required = true, num_args = 1..)]
    pub message: Vec<String>,

    /// Name of an attached file
    #[arg(long)]
    pub file: Option<String>,

    /// MIME type of the attachment
    #[arg(long, requires = "file", default_value = "text/plain")]
    pub mime: String,

    /// Continue from the stored conversation
    #[arg(long = "continue")]
    pub continue_reasoning: bool,

    /// Model name (overrides settings)
    #[arg(short, long)]
    pub model: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ValidationArgs {
    #[command(subcommand)]
    pub command: ValidationCommands,
}

#[derive(Subcommand, Debug)]
pub enum ValidationCommands {
    /// Record a validation result for a file
    Record {
        file: String,

        /// The file failed validation
        #[arg(long)]
        failed: bool,

        /// Detail lines (repeatable)
        #[arg(short, long)]
        detail: Vec<String>,
    },

    /// Show the validation summary
    Summary,
}

#[derive(clap::Args, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: Option<SettingsCommands>,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Print the effective settings
    Show,

    /// Print the settings file path
    Path,

    /// Write the effective settings to the settings file
    Save,
}

/// Output format for responses
#[derive(ValueEnum, Clone, Debug, Default, PartialEq)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Text,

    /// JSON output
    Json,
}
