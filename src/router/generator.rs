// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Text-generation capability supplied by the host

use async_trait::async_trait;

use crate::error::Result;

/// Turns a prompt into text
#[async_trait]
pub trait Generator: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}
