//! Pitch deck to profile fields, end to end

use super::document::DocumentTextExtractor;
use super::labels::ExtractionResult;
use super::prompt::FieldExtractionRequester;
use crate::types::{TextGenerator, UploadedDocument};
use crate::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Runs extraction, field request and parsing strictly in order
#[derive(Clone)]
pub struct ExtractionPipeline {
    extractor: Arc<DocumentTextExtractor>,
    requester: FieldExtractionRequester,
}

impl ExtractionPipeline {
    /// Create a pipeline
    pub fn new(extractor: Arc<DocumentTextExtractor>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            extractor,
            requester: FieldExtractionRequester::new(generator),
        }
    }

    /// Whether the document extractor has finished initializing
    pub fn is_ready(&self) -> bool {
        self.extractor.is_ready()
    }

    /// Turn one uploaded document into recognized profile fields
    pub async fn run(&self, upload: &UploadedDocument) -> Result<ExtractionResult> {
        let started = Instant::now();
        let text = self.extractor.extract(upload).await?;
        let extracted_in = started.elapsed();

        let requested = Instant::now();
        let raw = self.requester.request(&text).await?;
        let requested_in = requested.elapsed();

        let result = ExtractionResult::parse(&raw);
        info!(
            text_chars = text.chars().count(),
            fields = result.len(),
            extract_ms = extracted_in.as_millis() as u64,
            request_ms = requested_in.as_millis() as u64,
            "Extraction pipeline finished"
        );
        Ok(result)
    }
}
