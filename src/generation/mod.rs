pub mod huggingface;
pub mod normalize;

use crate::models::GenerationOutcome;
use async_trait::async_trait;

pub use huggingface::HuggingFaceClient;

/// Implementations never retry on their own.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> GenerationOutcome;
}
