use std::fmt;

use async_trait::async_trait;

use nw_core::{EmbeddingProvider, GenerationProvider, Result};

/// Deterministic offline model for tests and network-less runs. Vectors
/// are derived purely from character positions, so the same text always
/// embeds identically across processes.
pub struct DummyModel {
    dimension: usize,
}

impl DummyModel {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel")
            .field("dimension", &self.dimension)
            .finish()
    }
}

#[async_trait]
impl EmbeddingProvider for DummyModel {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut embedding = vec![0.0f32; self.dimension];
        for (i, c) in text.chars().enumerate() {
            let bucket = (c as usize + i) % self.dimension;
            embedding[bucket] += 1.0;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for x in &mut embedding {
                *x /= norm;
            }
        }
        Ok(embedding)
    }
}

#[async_trait]
impl GenerationProvider for DummyModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let tail: Vec<&str> = prompt.split_whitespace().rev().take(12).collect();
        let echo: Vec<&str> = tail.into_iter().rev().collect();
        Ok(format!("[dummy completion] {}", echo.join(" ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embeddings_are_deterministic_and_normalized() {
        let model = DummyModel::new(64);
        let a = model.embed("the same text").await.unwrap();
        let b = model.embed("the same text").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn different_texts_embed_differently() {
        let model = DummyModel::new(64);
        let a = model.embed("markets rallied today").await.unwrap();
        let b = model.embed("a storm hit the coast").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn generation_echoes_the_prompt_tail() {
        let model = DummyModel::new(8);
        let out = model.generate("question: what happened today").await.unwrap();
        assert!(out.contains("what happened today"));
    }
}
