//! Uploaded document payloads

use bytes::Bytes;

/// Media type a pitch deck must declare
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// A single user-supplied file
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    /// Original file name, if the client sent one
    pub file_name: Option<String>,
    /// Declared media type (Content-Type), possibly with parameters
    pub media_type: String,
    /// Raw file contents
    pub bytes: Bytes,
}

impl UploadedDocument {
    /// Create an upload from its declared media type and contents
    pub fn new(media_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: None,
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Attach the original file name
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Whether the declared media type is PDF (case-insensitive, parameters ignored)
    pub fn declares_pdf(&self) -> bool {
        self.media_type
            .split(';')
            .next()
            .map(|essence| essence.trim().eq_ignore_ascii_case(PDF_MEDIA_TYPE))
            .unwrap_or(false)
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
