// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Route, generate, record

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Map, Value};

use super::generator::Generator;
use super::{route, ChatRequest, RoutingDecision, TargetCapability};
use crate::error::Result;
use crate::store::{ChatTurn, ConversationRecord, ProjectStore};
use crate::utils::truncate_chars;

/// Characters of the message kept as `last_task`
const LAST_TASK_CHARS: usize = 100;

pub const CHAT_ACTION: &str = "chat_message_processed";

/// Generated answer and the capability that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub target: TargetCapability,
}

pub struct ConversationService {
    store: Arc<ProjectStore>,
    coder: Arc<dyn Generator>,
    interpreter: Arc<dyn Generator>,
    max_tokens: u32,
}

impl ConversationService {
    /// One generator serving both capabilities
    pub fn new(store: Arc<ProjectStore>, generator: Arc<dyn Generator>) -> Self {
        Self {
            store,
            coder: Arc::clone(&generator),
            interpreter: generator,
            max_tokens: 512,
        }
    }

    pub fn with_interpreter(mut self, generator: Arc<dyn Generator>) -> Self {
        self.interpreter = generator;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn generator_for(&self, target: TargetCapability) -> &Arc<dyn Generator> {
        match target {
            TargetCapability::Coder => &self.coder,
            TargetCapability::Interpreter => &self.interpreter,
        }
    }

    /// Answer a chat message and record the exchange.
    ///
    /// Generation failures are returned; persistence failures are only logged.
    pub async fn handle(
        &self,
        project_path: &Path,
        user_id: Option<&str>,
        request: &ChatRequest,
    ) -> Result<ChatReply> {
        let decision = route(request);
        let generator = self.generator_for(decision.target);
        tracing::debug!(
            "Routing message to {} via {}",
            decision.target,
            generator.name()
        );

        let response = generator
            .generate(&decision.prompt_text, self.max_tokens)
            .await?;

        let (fields, record) = exchange_documents(user_id, request, &decision, &response);
        let store = Arc::clone(&self.store);
        let project_path = project_path.to_path_buf();
        let user_id = user_id.map(str::to_string);
        // Store writes are blocking file IO behind a std mutex.
        let recorded = tokio::task::spawn_blocking(move || {
            record_exchange(&store, &project_path, user_id.as_deref(), fields, &record)
        })
        .await;
        if let Err(e) = recorded {
            tracing::warn!("Recording the chat exchange did not finish: {}", e);
        }

        Ok(ChatReply {
            response,
            target: decision.target,
        })
    }
}

/// Session tree fields and conversation record describing one exchange
fn exchange_documents(
    user_id: Option<&str>,
    request: &ChatRequest,
    decision: &RoutingDecision,
    response: &str,
) -> (Map<String, Value>, ConversationRecord) {
    let now = Utc::now();

    let mut fields = Map::new();
    fields.insert(
        "last_task".to_string(),
        json!(truncate_chars(&decision.message, LAST_TASK_CHARS)),
    );
    fields.insert("last_action".to_string(), json!(CHAT_ACTION));
    fields.insert("timestamp".to_string(), json!(now.to_rfc3339()));
    if let Some(id) = user_id {
        fields.insert("user_id".to_string(), Value::String(id.to_string()));
    }

    let mut messages = request.history.clone();
    messages.push(ChatTurn::user(&request.message));
    messages.push(ChatTurn::assistant(response));

    let record = ConversationRecord {
        messages,
        last_message: decision.message.clone(),
        response: response.to_string(),
        timestamp: now,
        user_id: user_id.map(str::to_string),
    };
    (fields, record)
}

fn record_exchange(
    store: &ProjectStore,
    project_path: &Path,
    user_id: Option<&str>,
    fields: Map<String, Value>,
    record: &ConversationRecord,
) {
    if let Err(e) = store.update_session_tree(project_path, user_id, fields) {
        tracing::warn!("Could not update session tree after chat: {}", e);
    }
    if let Err(e) = store.store_conversation(project_path, user_id, record) {
        tracing::warn!("Could not store conversation: {}", e);
    }
}
