//! Pitch deck extraction pipeline
//!
//! File, then text, then prompt, then model text, then recognized fields.
//! Each stage starts only after the previous one has produced its result.

pub mod document;
pub mod labels;
pub mod pipeline;
pub mod prompt;

pub use document::{concatenate_pages, DocumentTextExtractor, LopdfBackend, PdfBackend, PdfDocument};
pub use labels::{field_for_label, ExtractionResult};
pub use pipeline::ExtractionPipeline;
pub use prompt::{
    build_prompt, truncate_to_budget, FieldExtractionRequester, INDUSTRY_CHOICES,
    PROMPT_TEXT_BUDGET, TARGET_LABELS,
};
