use std::time::Duration;

use async_trait::async_trait;

use crate::types::{Article, CachedAnswer, ScoredArticle, StoreStats};
use crate::Result;

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert or replace the article stored under `id`.
    async fn upsert(&self, id: &str, vector: &[f32], article: &Article) -> Result<()>;

    /// Top-`limit` nearest articles by cosine similarity, excluding any
    /// result scoring below `score_threshold`.
    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
        score_threshold: f32,
    ) -> Result<Vec<ScoredArticle>>;

    /// Drop every stored article.
    async fn clear(&self) -> Result<()>;

    async fn stats(&self) -> Result<StoreStats>;
}

/// Best-effort answer cache. Absence of a value is not an error, and
/// callers treat any failure as a miss.
#[async_trait]
pub trait AnswerCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CachedAnswer>>;

    async fn put(&self, key: &str, answer: CachedAnswer, ttl: Duration) -> Result<()>;
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a < f32::EPSILON || mag_b < f32::EPSILON {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = vec![0.5, 0.3, 0.2];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_mismatched_lengths_is_zero() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }
}
