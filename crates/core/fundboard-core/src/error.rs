//! Error types for Fundboard core

use thiserror::Error;

/// Main error type for Fundboard operations
#[derive(Debug, Error)]
pub enum FundboardError {
    /// Uploaded file does not declare a PDF media type
    #[error("Unsupported format: expected application/pdf, got '{0}'")]
    UnsupportedFormat(String),

    /// PDF parsing capability has not finished initializing
    #[error("Document extractor is not ready yet, please retry in a moment")]
    ExtractorNotReady,

    /// Every page was empty or failed to parse
    #[error("No extractable text found in the uploaded document")]
    NoExtractableText,

    /// Payload declared as PDF but could not be opened as one
    #[error("Unreadable document: {0}")]
    UnreadableDocument(String),

    /// Non-success HTTP status from the generative-text endpoint
    #[error("Upstream error (status {status}): {body}")]
    Upstream {
        /// HTTP status code returned upstream
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Generative-text response did not have the expected shape
    #[error("Upstream response malformed: {0}")]
    UpstreamMalformed(String),

    /// Persistence call failed
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found error (generic)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authentication/authorization error
    #[error("Auth error: {0}")]
    Auth(String),

    /// Network/HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Runtime error
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Convenient Result type using FundboardError
pub type Result<T> = std::result::Result<T, FundboardError>;

impl FundboardError {
    /// Create an unsupported format error
    pub fn unsupported_format(media_type: impl Into<String>) -> Self {
        FundboardError::UnsupportedFormat(media_type.into())
    }

    /// Create an unreadable document error
    pub fn unreadable(msg: impl Into<String>) -> Self {
        FundboardError::UnreadableDocument(msg.into())
    }

    /// Create an upstream status error
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        FundboardError::Upstream {
            status,
            body: body.into(),
        }
    }

    /// Create an upstream malformed-response error
    pub fn upstream_malformed(msg: impl Into<String>) -> Self {
        FundboardError::UpstreamMalformed(msg.into())
    }

    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        FundboardError::Store(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        FundboardError::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        FundboardError::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        FundboardError::NotFound(msg.into())
    }

    /// Create an auth error
    pub fn auth(msg: impl Into<String>) -> Self {
        FundboardError::Auth(msg.into())
    }

    /// Create a runtime error
    pub fn runtime(msg: impl Into<String>) -> Self {
        FundboardError::Runtime(msg.into())
    }

    /// Whether the message is meant to be shown to the user as-is.
    ///
    /// Covers the extraction and persistence failures a user can act on;
    /// everything else is reported as a generic internal failure.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            FundboardError::UnsupportedFormat(_)
                | FundboardError::ExtractorNotReady
                | FundboardError::NoExtractableText
                | FundboardError::UnreadableDocument(_)
                | FundboardError::Upstream { .. }
                | FundboardError::UpstreamMalformed(_)
                | FundboardError::Store(_)
                | FundboardError::Validation(_)
                | FundboardError::NotFound(_)
                | FundboardError::Auth(_)
        )
    }
}
