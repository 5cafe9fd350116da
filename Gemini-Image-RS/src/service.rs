use serde_json::Value;
use std::future::Future;

use crate::error::Result;
use crate::image::GeneratedImage;

/// The three remote capabilities the rest of the system relies on.
///
/// [`GeminiClient`](crate::GeminiClient) is the real implementation; tests
/// and embedders can provide their own. Every call is stateless: anything the
/// model should stay consistent with must be passed in again.
pub trait ImageService: Send + Sync {
    /// Generate a new image from a text prompt.
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<GeneratedImage>> + Send;

    /// Produce a new image from `source` and a text instruction.
    fn edit(
        &self,
        prompt: &str,
        source: &GeneratedImage,
    ) -> impl Future<Output = Result<GeneratedImage>> + Send;

    /// Ask the text model for a reply constrained to `schema`, with `context`
    /// supplied as visual input. Returns the raw reply text.
    fn generate_structured(
        &self,
        prompt: &str,
        context: &GeneratedImage,
        schema: &Value,
    ) -> impl Future<Output = Result<String>> + Send;
}
