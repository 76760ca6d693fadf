// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Explicit application context
//!
//! Built once at startup and passed to command handlers. Holds the shared
//! `ProjectStore` plus the project and user a session is bound to.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Settings;
use crate::continuity;
use crate::error::Result;
use crate::explorer::FileExplorer;
use crate::router::{ConversationService, Generator, OllamaGenerator};
use crate::store::{ProjectStore, StateOwner};

pub struct AppContext {
    settings: Settings,
    store: Arc<ProjectStore>,
    project_root: PathBuf,
    user_id: Option<String>,
}

impl AppContext {
    /// Bind a context to a project and optional user. Rejects unusable user ids.
    pub fn new(settings: Settings, project_root: PathBuf, user_id: Option<String>) -> Result<Self> {
        StateOwner::from_user_id(user_id.as_deref())?;
        let store = Arc::new(ProjectStore::from_config(&settings.store));
        Ok(Self {
            settings,
            store,
            project_root,
            user_id,
        })
    }

    /// Same project and store, different user
    pub fn for_user(&self, user_id: Option<String>) -> Result<Self> {
        StateOwner::from_user_id(user_id.as_deref())?;
        Ok(Self {
            settings: self.settings.clone(),
            store: Arc::clone(&self.store),
            project_root: self.project_root.clone(),
            user_id,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<ProjectStore> {
        &self.store
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn explorer(&self) -> FileExplorer {
        FileExplorer::new(
            self.project_root.clone(),
            Arc::clone(&self.store),
            self.user_id.clone(),
        )
        .with_config(self.settings.explorer.clone())
    }

    /// Conversation service backed by the configured model server
    pub fn conversation_service(&self) -> Result<ConversationService> {
        let generator = OllamaGenerator::from_config(&self.settings.model)?;
        Ok(self.conversation_service_with(Arc::new(generator)))
    }

    pub fn conversation_service_with(&self, generator: Arc<dyn Generator>) -> ConversationService {
        ConversationService::new(Arc::clone(&self.store), generator)
            .with_max_tokens(self.settings.model.max_tokens)
    }

    pub fn continuity_message(&self) -> Option<String> {
        continuity::build_continuity_message(&self.store, &self.project_root, self.user_id())
    }
}
