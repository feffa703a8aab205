//! REST API server
//!
//! Routes, body limit, request tracing and CORS around the handlers.

use super::handlers::{
    chat_greeting_handler, chat_handler, draft_handler, edit_draft_handler, health_check,
    import_draft_handler, opportunities_handler, profiles_handler, reload_draft_handler,
    save_profile_handler,
};
use super::state::ServerState;
use crate::{FundboardError, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Build the Axum router
pub fn build_router(state: ServerState) -> Router {
    let enable_cors = state.config.enable_cors;
    let max_upload_bytes = state.config.max_upload_bytes;

    let mut router = Router::new()
        // Health check (no auth required)
        .route("/health", get(health_check))
        .route("/opportunities", get(opportunities_handler))
        .route("/profiles", get(profiles_handler))
        .route("/profile/draft", get(draft_handler).patch(edit_draft_handler))
        .route("/profile/draft/import", post(import_draft_handler))
        .route("/profile/draft/reload", post(reload_draft_handler))
        .route("/profile/save", post(save_profile_handler))
        .route("/chat", post(chat_handler))
        .route("/chat/greeting", get(chat_greeting_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // outermost layer
    if enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router = router.layer(cors);
    }

    router
}

/// Fundboard API server
pub struct FundboardServer {
    state: ServerState,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    local_addr: Option<SocketAddr>,
}

impl FundboardServer {
    /// Create a stopped server
    pub fn new(state: ServerState) -> Self {
        Self {
            state,
            shutdown_tx: None,
            local_addr: None,
        }
    }

    /// Bind and start serving in the background; returns the bound address
    pub async fn start(&mut self) -> Result<SocketAddr> {
        if self.is_running() {
            return Err(FundboardError::config("Server already running"));
        }

        let addr = self.state.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| FundboardError::config(format!("Failed to bind to {}: {}", addr, e)))?;
        let local_addr = listener.local_addr()?;

        info!("Starting Fundboard API server on {}", local_addr);
        if !self.state.auth_manager.is_enabled() {
            info!("No API tokens configured, bearer tokens are used as user ids");
        }

        let router = build_router(self.state.clone());
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.shutdown_tx = Some(tx);
        self.local_addr = Some(local_addr);

        tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async {
                let _ = rx.await;
            });
            if let Err(e) = server.await {
                error!("Server error: {}", e);
            }
        });

        Ok(local_addr)
    }

    /// Stop the server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            self.local_addr = None;
            info!("Fundboard API server stopped");
        }
    }

    /// Check if server is running
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }

    /// Address the server is bound to while running
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}
