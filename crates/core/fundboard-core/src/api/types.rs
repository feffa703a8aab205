//! Request and response bodies for the REST API

use crate::chat::ChatMessage;
use crate::draft::DraftSnapshot;
use crate::types::ProfileField;
use serde::{Deserialize, Serialize};

/// Uniform response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Success status
    pub success: bool,

    /// Response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// HTTP status code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl<T> ApiResponse<T> {
    /// Create a success response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: Some(200),
        }
    }

    /// Create an error response
    pub fn error(message: impl Into<String>, code: u16) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            code: Some(code),
        }
    }
}

/// `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `ok` while the process serves requests
    pub status: String,
    /// Whether PDF extraction has finished initializing
    pub extractor_ready: bool,
    /// Profile store backend
    pub store: String,
    /// Text generator backend
    pub generator: String,
    /// Uptime in seconds
    pub uptime: u64,
    /// Timestamp
    pub timestamp: String,
}

/// Query string of `GET /opportunities`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpportunityQuery {
    /// Only opportunities targeting this stage
    pub stage: Option<String>,
}

/// `PATCH /profile/draft`
#[derive(Debug, Clone, Deserialize)]
pub struct EditFieldRequest {
    /// Field key, e.g. `fundingStage`
    pub field: ProfileField,
    /// New value; null or blank clears the field
    #[serde(default)]
    pub value: Option<String>,
}

/// `POST /profile/draft/import`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    /// Fields the model output filled in
    pub recognized_fields: Vec<ProfileField>,
    /// Draft after the import
    pub draft: DraftSnapshot,
}

/// `POST /chat`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// Conversation so far, ending with the user's message
    pub messages: Vec<ChatMessage>,
}

/// Reply of `POST /chat` and `GET /chat/greeting`
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    /// Assistant message
    pub message: ChatMessage,
}
