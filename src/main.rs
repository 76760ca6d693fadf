// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! bapXcoder - project-scoped coding assistant for your terminal
//!
//! Entry point for the `bapx` CLI.

use std::path::PathBuf;

use clap::Parser;

use bapxcoder::app::AppContext;
use bapxcoder::cli::{Cli, Commands};
use bapxcoder::commands;
use bapxcoder::config::Settings;
use bapxcoder::error::Result;
use bapxcoder::utils;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    // `-v` turns on crate diagnostics; RUST_LOG still takes precedence.
    if cli.verbose > 0 {
        let level = if cli.verbose > 1 { "trace" } else { "debug" };
        if let Ok(parsed) = format!("bapxcoder={}", level).parse() {
            env_filter = env_filter.add_directive(parsed);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{}", utils::format_error(&e));
        std::process::exit(1);
    }
}

fn resolve_project_root(directory: Option<PathBuf>) -> Result<PathBuf> {
    let root = match directory {
        Some(dir) => dir,
        None => match utils::find_project_root() {
            Some(root) => root,
            None => std::env::current_dir()?,
        },
    };
    Ok(root.canonicalize().unwrap_or(root))
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load()?;
    Settings::ensure_directories()?;

    let format = cli.format;

    // Settings commands don't need a project.
    if let Commands::Settings(args) = &cli.command {
        return commands::settings::execute(&settings, args.command.as_ref(), &format);
    }

    let project_root = resolve_project_root(cli.directory)?;
    tracing::debug!("Project root: {}", project_root.display());
    let ctx = AppContext::new(settings, project_root, cli.user)?;

    match cli.command {
        Commands::Init => commands::init(&ctx, &format),
        Commands::Todo(args) => commands::todo::execute(&ctx, &args.command, &format),
        Commands::Session(args) => commands::session::execute(&ctx, &args.command, &format),
        Commands::Tree(args) => commands::files::tree(&ctx, &args, &format),
        Commands::Read { path } => commands::files::read(&ctx, &path, &format),
        Commands::Write { path, content } => {
            commands::files::write(&ctx, &path, content.as_deref(), &format)
        }
        Commands::Create { path, content } => commands::files::create(&ctx, &path, &content, &format),
        Commands::Rm { path } => commands::files::remove(&ctx, &path, &format),
        Commands::Mkdir { path } => commands::files::mkdir(&ctx, &path, &format),
        Commands::Search(args) => commands::files::search(&ctx, &args, &format),
        Commands::Stats => commands::files::stats(&ctx, &format),
        Commands::Recent => commands::files::recent(&ctx, &format),
        Commands::Chat(args) => commands::chat::execute(&ctx, &args, &format).await,
        Commands::Validation(args) => commands::validation::execute(&ctx, &args.command, &format),
        Commands::Settings(_) => Ok(()),
    }
}
