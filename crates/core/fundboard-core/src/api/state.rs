//! Shared state for the REST API

use super::auth::SessionAuthManager;
use crate::chat::ChatAssistant;
use crate::config::FundboardConfig;
use crate::draft::ProfileEditor;
use crate::extraction::ExtractionPipeline;
use crate::session::{SessionContext, UserIdentity};
use crate::types::{ProfileStore, TextGenerator};
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::debug;

/// Server state shared by every handler
#[derive(Clone)]
pub struct ServerState {
    /// Authentication manager
    pub auth_manager: Arc<SessionAuthManager>,

    /// Profile persistence
    pub store: Arc<dyn ProfileStore>,

    /// Pitch deck extraction
    pub pipeline: ExtractionPipeline,

    /// Founder chat
    pub chat: ChatAssistant,

    /// Name of the text generator backend
    pub generator_name: String,

    /// One editor per user, created on first use
    editors: Arc<RwLock<HashMap<String, Arc<ProfileEditor>>>>,

    /// Configuration
    pub config: Arc<FundboardConfig>,

    /// Server start time
    pub start_time: Instant,
}

impl ServerState {
    /// Assemble the state
    pub fn new(
        config: FundboardConfig,
        store: Arc<dyn ProfileStore>,
        generator: Arc<dyn TextGenerator>,
        pipeline: ExtractionPipeline,
    ) -> Self {
        Self {
            auth_manager: Arc::new(SessionAuthManager::new(config.api_tokens.clone())),
            store,
            pipeline,
            chat: ChatAssistant::new(Arc::clone(&generator)),
            generator_name: generator.name().to_string(),
            editors: Arc::new(RwLock::new(HashMap::new())),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// The user's editor, loading their saved profile the first time
    pub async fn editor_for(&self, user: &UserIdentity) -> Result<Arc<ProfileEditor>> {
        if let Some(editor) = self.editors.read().await.get(&user.user_id) {
            return Ok(Arc::clone(editor));
        }

        let editor = Arc::new(ProfileEditor::new(
            SessionContext::signed_in(user.clone()),
            Arc::clone(&self.store),
            self.pipeline.clone(),
            self.config.editor.clone(),
        ));
        editor.load().await?;

        let mut editors = self.editors.write().await;
        let editor = editors
            .entry(user.user_id.clone())
            .or_insert(editor);
        debug!(user_id = %user.user_id, "Profile editor ready");
        Ok(Arc::clone(editor))
    }

    /// Number of users with an open editor
    pub async fn editor_count(&self) -> usize {
        self.editors.read().await.len()
    }
}
