// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! bapXcoder - project-scoped coding assistant with persistent session state.
//!
//! This crate exposes the shared runtime used by the `bapx` CLI (`src/main.rs`).
//!
//! Architecture highlights:
//! - `store`: the `.bapXcoder` control directory (session trees, todos,
//!   conversations, validation log) with atomic, per-owner serialized writes
//! - `continuity`: "resume where you left off" summaries built from stored state
//! - `explorer`: project-rooted file operations, tree, search and statistics
//! - `router`: keyword routing between the coder and interpreter capabilities,
//!   the `Generator` seam and the Ollama backend
//! - `app`, `cli`, `commands`: the explicit context and the command surface

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod continuity;
pub mod error;
pub mod explorer;
pub mod router;
pub mod store;
pub mod utils;

pub use error::{BapxError, Result};
