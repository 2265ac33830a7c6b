use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::{
    qdrant::{
        vectors_config::Config, CreateCollection, Distance, PointStruct, SearchPoints,
        UpsertPoints, VectorParams, VectorsConfig, Vectors, WithPayloadSelector,
    },
    Qdrant,
};
use uuid::Uuid;

use nw_core::{Article, ArticleStore, Error, Result, ScoredArticle, StoreStats, StoreStatus};

/// Qdrant-backed article store. The collection is created on connect if
/// missing, with cosine distance at the configured dimension.
pub struct QdrantStore {
    client: Qdrant,
    collection: String,
    dimension: u64,
}

impl QdrantStore {
    pub async fn connect(url: &str, collection: &str, dimension: u64) -> Result<Self> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| Error::Storage(format!("qdrant client: {}", e)))?;

        let store = Self {
            client,
            collection: collection.to_string(),
            dimension,
        };
        store.ensure_collection().await?;
        Ok(store)
    }

    async fn ensure_collection(&self) -> Result<()> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| Error::Storage(format!("qdrant list collections: {}", e)))?;

        if collections
            .collections
            .iter()
            .any(|c| c.name == self.collection)
        {
            return Ok(());
        }

        let vector_config = VectorsConfig {
            config: Some(Config::Params(VectorParams {
                size: self.dimension,
                distance: Distance::Cosine.into(),
                ..Default::default()
            })),
        };

        self.client
            .create_collection(CreateCollection {
                collection_name: self.collection.clone(),
                vectors_config: Some(vector_config),
                ..Default::default()
            })
            .await
            .map_err(|e| Error::Storage(format!("qdrant create collection: {}", e)))?;

        Ok(())
    }

    // Point ids must be UUIDs; deriving one from the content-addressed
    // article id keeps re-ingestion an overwrite rather than an append.
    fn point_id(article_id: &str) -> String {
        Uuid::new_v5(&Uuid::NAMESPACE_URL, article_id.as_bytes()).to_string()
    }
}

#[async_trait]
impl ArticleStore for QdrantStore {
    async fn upsert(&self, id: &str, vector: &[f32], article: &Article) -> Result<()> {
        let doc = serde_json::to_string(article)?;

        let mut payload = HashMap::new();
        payload.insert("article_id".to_string(), id.to_string().into());
        payload.insert("title".to_string(), article.title.clone().into());
        payload.insert("source".to_string(), article.source.clone().into());
        payload.insert(
            "published_at".to_string(),
            article.published_at.to_rfc3339().into(),
        );
        payload.insert("doc".to_string(), doc.into());

        let point = PointStruct {
            id: Some(Self::point_id(id).into()),
            vectors: Some(Vectors::from(vector.to_vec())),
            payload,
        };

        self.client
            .upsert_points(UpsertPoints {
                collection_name: self.collection.clone(),
                points: vec![point],
                ..Default::default()
            })
            .await
            .map_err(|e| Error::Storage(format!("qdrant upsert: {}", e)))?;

        Ok(())
    }

    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
        score_threshold: f32,
    ) -> Result<Vec<ScoredArticle>> {
        let request = SearchPoints {
            collection_name: self.collection.clone(),
            vector: vector.to_vec(),
            limit: limit as u64,
            score_threshold: Some(score_threshold),
            with_payload: Some(WithPayloadSelector::from(true)),
            ..Default::default()
        };

        let results = self
            .client
            .search_points(request)
            .await
            .map_err(|e| Error::Storage(format!("qdrant search: {}", e)))?;

        let mut scored = Vec::new();
        for point in results.result {
            if let Some(doc) = point.payload.get("doc").and_then(|v| v.as_str()) {
                match serde_json::from_str::<Article>(doc) {
                    Ok(article) => scored.push(ScoredArticle {
                        article,
                        score: point.score,
                    }),
                    Err(e) => tracing::warn!("skipping undecodable payload: {}", e),
                }
            }
        }

        Ok(scored)
    }

    async fn clear(&self) -> Result<()> {
        self.client
            .delete_collection(self.collection.as_str())
            .await
            .map_err(|e| Error::Storage(format!("qdrant delete collection: {}", e)))?;
        self.ensure_collection().await
    }

    async fn stats(&self) -> Result<StoreStats> {
        let info = self
            .client
            .collection_info(self.collection.as_str())
            .await
            .map_err(|e| Error::Storage(format!("qdrant collection info: {}", e)))?;

        let count = info
            .result
            .and_then(|r| r.points_count)
            .unwrap_or_default() as usize;

        Ok(StoreStats {
            count,
            status: StoreStatus::Available,
        })
    }
}
