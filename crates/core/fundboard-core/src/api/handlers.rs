//! Request handlers for the REST API

use super::state::ServerState;
use super::types::*;
use crate::chat::ChatMessage;
use crate::draft::DraftSnapshot;
use crate::opportunities::{list_opportunities, FundingOpportunity};
use crate::session::UserIdentity;
use crate::types::{StartupProfile, UploadedDocument};
use crate::FundboardError;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequestParts, Query, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error, info, warn};

/// Header carrying the original file name of an upload
pub const FILE_NAME_HEADER: &str = "x-file-name";

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// 400
    BadRequest(String),
    /// 401
    Unauthorized(String),
    /// 404
    NotFound(String),
    /// 415
    UnsupportedMediaType(String),
    /// 422
    Unprocessable(String),
    /// 502
    BadGateway(String),
    /// 503
    ServiceUnavailable(String),
    /// 500
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::UnsupportedMediaType(msg)
            | ApiError::Unprocessable(msg)
            | ApiError::BadGateway(msg)
            | ApiError::ServiceUnavailable(msg)
            | ApiError::Internal(msg) => msg,
        };

        let body = Json(serde_json::json!({
            "success": false,
            "error": message,
            "code": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

impl From<FundboardError> for ApiError {
    fn from(err: FundboardError) -> Self {
        let message = err.to_string();
        match err {
            FundboardError::UnsupportedFormat(_) => ApiError::UnsupportedMediaType(message),
            FundboardError::ExtractorNotReady => ApiError::ServiceUnavailable(message),
            FundboardError::NoExtractableText | FundboardError::UnreadableDocument(_) => {
                ApiError::Unprocessable(message)
            }
            FundboardError::Upstream { .. } | FundboardError::UpstreamMalformed(_) => {
                warn!("Upstream failure: {}", message);
                ApiError::BadGateway(message)
            }
            FundboardError::Validation(_) => ApiError::BadRequest(message),
            FundboardError::Auth(_) => ApiError::Unauthorized(message),
            FundboardError::NotFound(_) => ApiError::NotFound(message),
            FundboardError::Store(_) => {
                error!("Store failure: {}", message);
                ApiError::Internal(message)
            }
            _ => {
                error!("FundboardError: {}", message);
                ApiError::Internal("Internal server error".to_string())
            }
        }
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

/// The caller, resolved from the `Authorization: Bearer` header
pub struct AuthenticatedUser(pub UserIdentity);

#[async_trait]
impl FromRequestParts<ServerState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                ApiError::Unauthorized("Missing or invalid Authorization header".to_string())
            })?;

        let user = state.auth_manager.authenticate(token)?;
        Ok(AuthenticatedUser(user))
    }
}

/// Health check (no auth required)
pub async fn health_check(State(state): State<ServerState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        extractor_ready: state.pipeline.is_ready(),
        store: state.store.name().to_string(),
        generator: state.generator_name.clone(),
        uptime: state.start_time.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Funding opportunities, optionally filtered by stage
pub async fn opportunities_handler(
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<OpportunityQuery>,
) -> Json<ApiResponse<Vec<&'static FundingOpportunity>>> {
    Json(ApiResponse::success(list_opportunities(query.stage.as_deref())))
}

/// Every stored profile of the caller
pub async fn profiles_handler(
    State(state): State<ServerState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> ApiResult<Vec<StartupProfile>> {
    let profiles = state.store.list_by_owner(&user.user_id).await?;
    Ok(Json(ApiResponse::success(profiles)))
}

/// Current draft
pub async fn draft_handler(
    State(state): State<ServerState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> ApiResult<DraftSnapshot> {
    let editor = state.editor_for(&user).await?;
    Ok(Json(ApiResponse::success(editor.snapshot().await)))
}

/// Manual edit of one draft field
pub async fn edit_draft_handler(
    State(state): State<ServerState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(req): Json<EditFieldRequest>,
) -> ApiResult<DraftSnapshot> {
    let editor = state.editor_for(&user).await?;
    debug!(user_id = %user.user_id, field = %req.field, "Draft field edited");
    let snapshot = editor.edit_field(req.field, req.value).await;
    Ok(Json(ApiResponse::success(snapshot)))
}

/// Pitch deck upload; the body is the raw file
pub async fn import_draft_handler(
    State(state): State<ServerState>,
    AuthenticatedUser(user): AuthenticatedUser,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<ImportResponse> {
    let media_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let mut upload = UploadedDocument::new(media_type, body);
    if let Some(name) = headers.get(FILE_NAME_HEADER).and_then(|v| v.to_str().ok()) {
        upload = upload.with_file_name(name);
    }

    info!(
        user_id = %user.user_id,
        bytes = upload.len(),
        media_type = %upload.media_type,
        "Pitch deck import requested"
    );

    let editor = state.editor_for(&user).await?;
    let result = editor.import_pitch_deck(&upload).await?;

    Ok(Json(ApiResponse::success(ImportResponse {
        recognized_fields: result.fields().collect(),
        draft: editor.snapshot().await,
    })))
}

/// Write the draft to the store now
pub async fn save_profile_handler(
    State(state): State<ServerState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> ApiResult<DraftSnapshot> {
    let editor = state.editor_for(&user).await?;
    let snapshot = editor.save().await?;
    Ok(Json(ApiResponse::success(snapshot)))
}

/// Drop unsaved edits and re-read the stored profile
pub async fn reload_draft_handler(
    State(state): State<ServerState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> ApiResult<DraftSnapshot> {
    let editor = state.editor_for(&user).await?;
    let snapshot = editor.reload().await?;
    Ok(Json(ApiResponse::success(snapshot)))
}

/// Opening message for a new conversation
pub async fn chat_greeting_handler(
    AuthenticatedUser(_user): AuthenticatedUser,
) -> Json<ApiResponse<ChatResponse>> {
    Json(ApiResponse::success(ChatResponse {
        message: ChatMessage::greeting(),
    }))
}

/// Reply to a conversation
pub async fn chat_handler(
    State(state): State<ServerState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(req): Json<ChatRequest>,
) -> ApiResult<ChatResponse> {
    debug!(user_id = %user.user_id, messages = req.messages.len(), "Chat request");
    let message = state.chat.reply(&req.messages).await?;
    Ok(Json(ApiResponse::success(ChatResponse { message })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_response() {
        let err = ApiError::BadRequest("test error".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_taxonomy_status_codes() {
        let cases = [
            (FundboardError::unsupported_format("text/plain"), 415),
            (FundboardError::ExtractorNotReady, 503),
            (FundboardError::NoExtractableText, 422),
            (FundboardError::unreadable("bad xref"), 422),
            (FundboardError::upstream(500, "boom"), 502),
            (FundboardError::upstream_malformed("no candidates"), 502),
            (FundboardError::store("timeout"), 500),
            (FundboardError::validation("empty"), 400),
            (FundboardError::auth("nope"), 401),
            (FundboardError::not_found("profile"), 404),
        ];
        for (err, code) in cases {
            assert_eq!(ApiError::from(err).status().as_u16(), code);
        }
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let err = ApiError::from(FundboardError::runtime("join error in worker 3"));
        match err {
            ApiError::Internal(msg) => assert_eq!(msg, "Internal server error"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
