//! REST API
//!
//! Browser clients use this surface to keep a startup profile up to date,
//! import a pitch deck into it, browse funding opportunities and chat with
//! the assistant.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check (no auth required)
//! - `GET /opportunities?stage=` - Funding opportunity catalog
//! - `GET /profiles` - Stored profiles of the caller
//! - `GET /profile/draft` - Current draft (state, fields, last error)
//! - `PATCH /profile/draft` - `{ "field": "fundingStage", "value": "Seed" }`
//! - `POST /profile/draft/import` - Raw PDF body; `Content-Type` is the declared media type
//! - `POST /profile/draft/reload` - Discard unsaved edits
//! - `POST /profile/save` - Write the draft now
//! - `GET /chat/greeting` - Opening assistant message
//! - `POST /chat` - `{ "messages": [{ "role": "user", "content": "..." }] }`
//!
//! # Authentication
//!
//! Every endpoint except `/health` needs an Authorization header:
//!
//! ```text
//! Authorization: Bearer <your-token>
//! ```
//!
//! Tokens are SHA-256 hashed and mapped to user ids through
//! `FUNDBOARD_API_TOKENS`.

pub mod auth;
pub mod handlers;
pub mod server;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export main types
pub use auth::SessionAuthManager;
pub use handlers::{ApiError, AuthenticatedUser, FILE_NAME_HEADER};
pub use server::{build_router, FundboardServer};
pub use state::ServerState;
pub use types::{
    ApiResponse, ChatRequest, ChatResponse, EditFieldRequest, HealthResponse, ImportResponse,
    OpportunityQuery,
};
