//! Text generation trait.

use async_trait::async_trait;

use crate::error::GenerationError;

/// Outcome of one generation request.
pub type GenerationResult = Result<String, GenerationError>;

/// Remote text generation for a single prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generator identifier, used in logs.
    fn id(&self) -> &str;

    /// Generate text for `prompt`, authenticating with `credential`.
    async fn generate(&self, prompt: &str, credential: &str) -> GenerationResult;
}
