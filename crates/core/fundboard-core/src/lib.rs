//! Fundboard Core
//!
//! Backend of the startup-funding dashboard. It includes:
//!
//! - Startup profile types and the profile store interface
//! - Pitch deck extraction: PDF text, field request to a generative model, label parsing
//! - Profile draft editing with debounced auto-save
//! - Injected session context
//! - Funding opportunity catalog and founder chat assistant
//! - REST API (axum) with bearer-token sessions
//!
//! # Example: importing a pitch deck
//!
//! ```no_run
//! use fundboard_core::*;
//! use std::sync::Arc;
//!
//! async fn import(
//!     store: Arc<dyn ProfileStore>,
//!     generator: Arc<dyn TextGenerator>,
//!     pdf: Vec<u8>,
//! ) -> Result<()> {
//!     let extractor = Arc::new(DocumentTextExtractor::with_backend(Arc::new(LopdfBackend::new())));
//!     let pipeline = ExtractionPipeline::new(extractor, generator);
//!     let session = SessionContext::signed_in(UserIdentity::new("founder-1"));
//!
//!     let editor = ProfileEditor::new(session, store, pipeline, EditorConfig::default());
//!     editor.load().await?;
//!     editor.import_pitch_deck(&UploadedDocument::new("application/pdf", pdf)).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod autosave;
pub mod chat;
pub mod config;
pub mod draft;
pub mod error;
pub mod extraction;
pub mod opportunities;
pub mod session;
pub mod testing;
pub mod types;
pub mod utils;

// Re-export main types
pub use autosave::Debouncer;
pub use chat::{clean_reply, ChatAssistant, ChatMessage, ChatRole, GREETING};
pub use config::{
    get_env_bool, get_env_int, get_env_or, get_required_env, load_env, load_env_from_path,
    parse_token_grants, validate_env, EditorConfig, FundboardConfig, TokenGrant,
};
pub use draft::{DraftSnapshot, DraftState, ProfileEditor};
pub use error::{FundboardError, Result};
pub use extraction::{
    DocumentTextExtractor, ExtractionPipeline, ExtractionResult, FieldExtractionRequester,
    LopdfBackend, PdfBackend, PdfDocument,
};
pub use opportunities::{list_opportunities, FundingOpportunity};
pub use session::{SessionContext, SessionSubscription, UserIdentity};
pub use types::*;
pub use utils::logger::init_logging;
