//! Generative-text model abstraction

use crate::Result;
use async_trait::async_trait;

/// A remote text-generation endpoint
///
/// One call is one synchronous request: no retries, no streaming.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    /// Send a prompt and return the generated text unmodified
    async fn generate(&self, prompt: &str) -> Result<String>;
}
