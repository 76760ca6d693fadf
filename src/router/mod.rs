// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Conversation routing
//!
//! Decides whether a chat message goes to the coding capability or the
//! general interpreter, and builds the prompt text for it. Generation is
//! delegated to a [`Generator`]; [`ConversationService`] ties routing,
//! generation and persistence together.

pub mod generator;
pub mod mock;
pub mod ollama;
pub mod service;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::ChatTurn;

pub use generator::Generator;
pub use mock::MockGenerator;
pub use ollama::OllamaGenerator;
pub use service::{ChatReply, ConversationService};

/// Substrings that mark a message as coding-related (matched case-insensitively)
pub const CODING_KEYWORDS: [&str; 30] = [
    "code",
    "function",
    "class",
    "implement",
    "create",
    "generate",
    "write",
    "debug",
    "fix",
    "refactor",
    "test",
    "program",
    "script",
    "algorithm",
    "method",
    "variable",
    "syntax",
    "error",
    "module",
    "import",
    "library",
    "dependency",
    "build",
    "compile",
    "deploy",
    "api",
    "endpoint",
    "database",
    "migration",
    "configuration",
];

/// History turns considered when continuing a conversation
const HISTORY_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetCapability {
    Coder,
    Interpreter,
}

impl TargetCapability {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetCapability::Coder => "coder",
            TargetCapability::Interpreter => "interpreter",
        }
    }
}

impl fmt::Display for TargetCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File attached to a chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
}

impl Attachment {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Inbound chat message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub attachment: Option<Attachment>,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    #[serde(default)]
    pub continue_reasoning: bool,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn with_history(mut self, history: Vec<ChatTurn>) -> Self {
        self.history = history;
        self.continue_reasoning = true;
        self
    }
}

/// Where a message goes and what is sent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingDecision {
    pub target: TargetCapability,
    pub prompt_text: String,
    /// The user's message after attachment framing, without history
    pub message: String,
}

pub fn is_coding_related(text: &str) -> bool {
    let lower = text.to_lowercase();
    CODING_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Render the last few user/assistant turns as `User: ...` / `Assistant: ...` lines.
pub fn build_history_context(history: &[ChatTurn]) -> String {
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    history[start..]
        .iter()
        .filter(|turn| !turn.content.is_empty())
        .filter_map(|turn| match turn.role.as_str() {
            "user" => Some(format!("User: {}", turn.content)),
            "assistant" => Some(format!("Assistant: {}", turn.content)),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn coding_prompt(prompt: &str) -> String {
    format!(
        "[CODING TASK] {}\nGenerate appropriate code following best practices:",
        prompt
    )
}

/// Classify a request and build its prompt.
pub fn route(request: &ChatRequest) -> RoutingDecision {
    let (message, forced) = match &request.attachment {
        Some(file) if file.is_image() => (
            format!(
                "[Image Analysis Request] The user has attached an image: {}. {}",
                file.name, request.message
            ),
            Some(TargetCapability::Interpreter),
        ),
        Some(file) => (
            format!(
                "[File Analysis Request] The user has attached a file: {}. {}",
                file.name, request.message
            ),
            None,
        ),
        None => (request.message.clone(), None),
    };

    let target = forced.unwrap_or(if is_coding_related(&message) {
        TargetCapability::Coder
    } else {
        TargetCapability::Interpreter
    });

    let mut prompt = message.clone();
    if request.continue_reasoning && !request.history.is_empty() {
        let context = build_history_context(&request.history);
        prompt = format!("{}\n\nUser: {}\nAssistant:", context, message);
    }
    if target == TargetCapability::Coder {
        prompt = coding_prompt(&prompt);
    }

    RoutingDecision {
        target,
        prompt_text: prompt,
        message,
    }
}
