//! PDF text extraction
//!
//! Walks every page of an uploaded PDF and concatenates its text runs.
//! Runs within a page are joined by a single space and pages by a newline.
//! A page that fails to parse is skipped; extraction only fails when no
//! text survives at all. No layout, font or position data is kept.

use crate::types::UploadedDocument;
use crate::{FundboardError, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// A PDF parsing library
pub trait PdfBackend: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &str;

    /// Open a document from raw bytes
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn PdfDocument>>;
}

/// An opened PDF document
pub trait PdfDocument: Send {
    /// Number of pages
    fn page_count(&self) -> usize;

    /// Text runs of the page at `index` (zero-based), in content order
    fn page_runs(&self, index: usize) -> Result<Vec<String>>;
}

/// Pure-Rust backend built on `lopdf`
#[derive(Debug, Default, Clone)]
pub struct LopdfBackend;

impl LopdfBackend {
    /// Create the backend
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for LopdfBackend {
    fn name(&self) -> &str {
        "lopdf"
    }

    fn open(&self, bytes: &[u8]) -> Result<Box<dyn PdfDocument>> {
        let document = lopdf::Document::load_mem(bytes)
            .map_err(|e| FundboardError::unreadable(format!("invalid pdf: {}", e)))?;
        // get_pages is keyed by page number, so iteration order is page order
        let pages: Vec<u32> = document.get_pages().keys().copied().collect();
        Ok(Box::new(LopdfDocument { document, pages }))
    }
}

struct LopdfDocument {
    document: lopdf::Document,
    pages: Vec<u32>,
}

impl PdfDocument for LopdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_runs(&self, index: usize) -> Result<Vec<String>> {
        let page_number = *self
            .pages
            .get(index)
            .ok_or_else(|| FundboardError::not_found(format!("page index {}", index)))?;

        let text = self.document.extract_text(&[page_number]).map_err(|e| {
            FundboardError::unreadable(format!("page {}: {}", page_number, e))
        })?;

        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// Concatenate the text of every readable page
///
/// Pages that fail or yield no runs contribute nothing.
pub fn concatenate_pages(document: &dyn PdfDocument) -> Result<String> {
    let page_count = document.page_count();
    let mut pages: Vec<String> = Vec::with_capacity(page_count);

    for index in 0..page_count {
        match document.page_runs(index) {
            Ok(runs) => {
                let text = runs
                    .iter()
                    .map(|run| run.trim())
                    .filter(|run| !run.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                if !text.is_empty() {
                    pages.push(text);
                }
            }
            Err(e) => {
                warn!(page = index + 1, error = %e, "Skipping page that failed to parse");
            }
        }
    }

    let text = pages.join("\n");
    if text.trim().is_empty() {
        return Err(FundboardError::NoExtractableText);
    }

    debug!(
        pages = page_count,
        readable_pages = pages.len(),
        chars = text.chars().count(),
        "Concatenated PDF text"
    );
    Ok(text)
}

/// Document text extractor with asynchronous backend initialization
pub struct DocumentTextExtractor {
    backend: OnceCell<Arc<dyn PdfBackend>>,
}

impl DocumentTextExtractor {
    /// Create an extractor whose backend is not initialized yet
    pub fn new() -> Self {
        Self {
            backend: OnceCell::new(),
        }
    }

    /// Create an extractor that is ready immediately
    pub fn with_backend(backend: Arc<dyn PdfBackend>) -> Self {
        Self {
            backend: OnceCell::new_with(Some(backend)),
        }
    }

    /// Run the backend initializer once; later calls are no-ops
    pub async fn initialize<F, Fut>(&self, init: F) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<dyn PdfBackend>>>,
    {
        let backend = self.backend.get_or_try_init(init).await?;
        info!("PDF extractor ready (backend: {})", backend.name());
        Ok(())
    }

    /// Whether initialization has completed
    pub fn is_ready(&self) -> bool {
        self.backend.initialized()
    }

    /// Extract the page-ordered text of an uploaded PDF
    pub async fn extract(&self, upload: &UploadedDocument) -> Result<String> {
        if !upload.declares_pdf() {
            return Err(FundboardError::unsupported_format(upload.media_type.clone()));
        }

        let backend = self
            .backend
            .get()
            .cloned()
            .ok_or(FundboardError::ExtractorNotReady)?;

        debug!(
            bytes = upload.len(),
            file = upload.file_name.as_deref().unwrap_or("<unnamed>"),
            "Extracting PDF text"
        );

        let bytes = upload.bytes.clone();
        tokio::task::spawn_blocking(move || {
            let document = backend.open(&bytes)?;
            concatenate_pages(document.as_ref())
        })
        .await
        .map_err(|e| FundboardError::runtime(format!("PDF extraction task failed: {}", e)))?
    }
}

impl Default for DocumentTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}
