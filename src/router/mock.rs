// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Scripted generator for tests and offline use
//!
//! Returns queued responses in order (repeating the last one) and records
//! every prompt it receives.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::generator::Generator;
use crate::error::{BapxError, Result};

#[derive(Clone)]
pub struct MockGenerator {
    responses: Arc<Mutex<Vec<String>>>,
    prompts: Arc<Mutex<Vec<(String, u32)>>>,
    call_count: Arc<AtomicUsize>,
    fail_with: Option<String>,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("Mock generator lock was poisoned, recovering");
        poisoned.into_inner()
    })
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(vec!["Mock response".to_string()])),
            prompts: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
            fail_with: None,
        }
    }

    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.with_responses(vec![text.into()])
    }

    pub fn with_responses(self, texts: Vec<String>) -> Self {
        *lock(&self.responses) = texts;
        self
    }

    /// Make every call fail with a `Generation` error.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.fail_with = Some(message.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Prompts received so far with their token budgets
    pub fn prompts(&self) -> Vec<(String, u32)> {
        lock(&self.prompts).clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        lock(&self.prompts).last().map(|(p, _)| p.clone())
    }
}

#[async_trait]
impl Generator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let count = self.call_count.fetch_add(1, Ordering::SeqCst);
        lock(&self.prompts).push((prompt.to_string(), max_tokens));

        if let Some(message) = &self.fail_with {
            return Err(BapxError::Generation(message.clone()));
        }

        let responses = lock(&self.responses);
        Ok(responses
            .get(count.min(responses.len().saturating_sub(1)))
            .cloned()
            .unwrap_or_default())
    }
}
