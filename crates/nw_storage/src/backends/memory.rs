use async_trait::async_trait;
use tokio::sync::RwLock;

use nw_core::{cosine_similarity, Article, ArticleStore, Result, ScoredArticle, StoreStats, StoreStatus};

struct StoredPoint {
    id: String,
    vector: Vec<f32>,
    article: Article,
}

/// Brute-force in-memory vector store. The default backend: always
/// available, no external service, good enough for the article counts a
/// feed ingestion run produces.
pub struct MemoryStore {
    points: RwLock<Vec<StoredPoint>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            points: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn upsert(&self, id: &str, vector: &[f32], article: &Article) -> Result<()> {
        let mut points = self.points.write().await;
        if let Some(existing) = points.iter_mut().find(|p| p.id == id) {
            existing.vector = vector.to_vec();
            existing.article = article.clone();
        } else {
            points.push(StoredPoint {
                id: id.to_string(),
                vector: vector.to_vec(),
                article: article.clone(),
            });
        }
        Ok(())
    }

    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
        score_threshold: f32,
    ) -> Result<Vec<ScoredArticle>> {
        let points = self.points.read().await;
        let mut scored: Vec<ScoredArticle> = points
            .iter()
            .map(|p| ScoredArticle {
                article: p.article.clone(),
                score: cosine_similarity(vector, &p.vector),
            })
            .filter(|s| s.score >= score_threshold)
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn clear(&self) -> Result<()> {
        self.points.write().await.clear();
        Ok(())
    }

    async fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            count: self.points.read().await.len(),
            status: StoreStatus::Available,
        })
    }
}
