use async_trait::async_trait;

use crate::Result;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Fixed output dimension for this deployment.
    fn dimension(&self) -> usize;

    /// Embed a piece of text into a vector of `dimension()` floats.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Complete a single prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
