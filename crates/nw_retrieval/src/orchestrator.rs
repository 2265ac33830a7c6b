use std::sync::Arc;

use tracing::{debug, info, warn};

use nw_core::{
    AnswerCache, ArticleStore, CachedAnswer, ChatOutcome, ChatTurn, EmbeddingProvider,
    GenerationProvider, Result, RetrievalConfig, StoreStatus,
};

use crate::context::{build_context, build_prompt};
use crate::fingerprint::query_fingerprint;

/// Returned for every query while the vector store is unreachable.
pub const UNAVAILABLE_NOTICE: &str =
    "The news index is currently unavailable, so I cannot look anything up right now. \
Please try again once the service has reconnected to its article store.";

/// Returned when the generation provider fails mid-query.
pub const GENERATION_APOLOGY: &str =
    "Sorry, I could not produce an answer just now. Please try again in a moment.";

/// The query pipeline: cache probe, degraded-mode short-circuit, query
/// embedding, thresholded similarity search, context assembly, one
/// generation call, best-effort cache write.
///
/// Store availability is decided once at startup and threaded in here;
/// the orchestrator itself is stateless across requests.
pub struct RetrievalOrchestrator {
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn GenerationProvider>,
    store: Arc<dyn ArticleStore>,
    cache: Arc<dyn AnswerCache>,
    config: RetrievalConfig,
    store_status: StoreStatus,
}

impl RetrievalOrchestrator {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn GenerationProvider>,
        store: Arc<dyn ArticleStore>,
        cache: Arc<dyn AnswerCache>,
        config: RetrievalConfig,
        store_status: StoreStatus,
    ) -> Self {
        Self {
            embedder,
            generator,
            store,
            cache,
            config,
            store_status,
        }
    }

    pub fn store_status(&self) -> StoreStatus {
        self.store_status
    }

    /// Answer one query against the article index and the trailing
    /// conversation history. Only an embedding failure surfaces as `Err`;
    /// every other failure degrades into a fallback outcome.
    pub async fn answer(&self, query: &str, history: &[ChatTurn]) -> Result<ChatOutcome> {
        let fingerprint = query_fingerprint(query, history, self.config.fingerprint_turns);

        match self.cache.get(&fingerprint).await {
            Ok(Some(hit)) => {
                info!("💨 cache hit for query");
                let candidate_count = hit.sources.len();
                return Ok(ChatOutcome {
                    text: hit.text,
                    sources: hit.sources,
                    from_cache: true,
                    candidate_count,
                });
            }
            Ok(None) => {}
            Err(e) => debug!("cache read failed, treating as miss: {}", e),
        }

        if self.store_status == StoreStatus::Unavailable {
            info!("⛔ store unavailable, returning advisory response");
            return Ok(ChatOutcome {
                text: UNAVAILABLE_NOTICE.to_string(),
                sources: Vec::new(),
                from_cache: false,
                candidate_count: 0,
            });
        }

        // Without a query vector no search is possible; this is the one
        // failure the caller has to see.
        let vector = self.embedder.embed(query).await?;

        let candidates = match self
            .store
            .search(&vector, self.config.top_k, self.config.score_threshold)
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("search failed, continuing without candidates: {}", e);
                Vec::new()
            }
        };
        let candidate_count = candidates.len();
        debug!("{} candidates cleared the relevance gate", candidate_count);

        let context = build_context(&candidates);
        let prompt = build_prompt(query, &context, history, self.config.prompt_turns);
        let sources: Vec<_> = candidates.into_iter().map(|c| c.article).collect();

        let text = match self.generator.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("generation failed: {}", e);
                // Sources stay attached as metadata; the apology is not
                // cached so the next attempt retries generation.
                return Ok(ChatOutcome {
                    text: GENERATION_APOLOGY.to_string(),
                    sources,
                    from_cache: false,
                    candidate_count,
                });
            }
        };

        // An answer with no grounding is not a retrieval success and is
        // not cached; articles ingested within the TTL should be able to
        // answer the same question.
        if candidate_count > 0 {
            let entry = CachedAnswer {
                text: text.clone(),
                sources: sources.clone(),
            };
            if let Err(e) = self.cache.put(&fingerprint, entry, self.config.cache_ttl).await {
                warn!("cache write failed: {}", e);
            }
        }

        Ok(ChatOutcome {
            text,
            sources,
            from_cache: false,
            candidate_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use nw_core::{Article, Error, ScoredArticle, StoreStats};
    use nw_storage::MemoryCache;

    #[derive(Default)]
    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for CountingEmbedder {
        fn dimension(&self) -> usize {
            4
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1.0, 0.0, 0.0, 0.0])
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        fn dimension(&self) -> usize {
            4
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::Embedding("provider down".to_string()))
        }
    }

    #[derive(Default)]
    struct CountingGenerator {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl GenerationProvider for CountingGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Generation("model exploded".to_string()));
            }
            Ok(format!("answer derived from: {}", &prompt[..40.min(prompt.len())]))
        }
    }

    struct FixedStore {
        candidates: Vec<ScoredArticle>,
    }

    #[async_trait]
    impl ArticleStore for FixedStore {
        async fn upsert(&self, _id: &str, _vector: &[f32], _article: &Article) -> Result<()> {
            Ok(())
        }

        async fn search(
            &self,
            _vector: &[f32],
            _limit: usize,
            score_threshold: f32,
        ) -> Result<Vec<ScoredArticle>> {
            Ok(self
                .candidates
                .iter()
                .filter(|c| c.score >= score_threshold)
                .cloned()
                .collect())
        }

        async fn clear(&self) -> Result<()> {
            Ok(())
        }

        async fn stats(&self) -> Result<StoreStats> {
            Ok(StoreStats {
                count: self.candidates.len(),
                status: StoreStatus::Available,
            })
        }
    }

    struct BrokenCache;

    #[async_trait]
    impl AnswerCache for BrokenCache {
        async fn get(&self, _key: &str) -> Result<Option<CachedAnswer>> {
            Err(Error::Cache("read refused".to_string()))
        }

        async fn put(&self, _key: &str, _answer: CachedAnswer, _ttl: Duration) -> Result<()> {
            Err(Error::Cache("write refused".to_string()))
        }
    }

    fn candidate(title: &str, score: f32) -> ScoredArticle {
        ScoredArticle {
            article: Article {
                id: title.to_lowercase(),
                title: title.to_string(),
                content: format!("{} content", title),
                url: format!("http://test.com/{}", title),
                published_at: Utc::now(),
                source: "wire".to_string(),
                category: "world".to_string(),
                tags: BTreeSet::new(),
                word_count: 2,
            },
            score,
        }
    }

    struct Fixture {
        embedder: Arc<CountingEmbedder>,
        generator: Arc<CountingGenerator>,
        orchestrator: RetrievalOrchestrator,
    }

    fn fixture(candidates: Vec<ScoredArticle>, status: StoreStatus, fail_generation: bool) -> Fixture {
        let embedder = Arc::new(CountingEmbedder::default());
        let generator = Arc::new(CountingGenerator {
            calls: AtomicUsize::new(0),
            fail: fail_generation,
        });
        let orchestrator = RetrievalOrchestrator::new(
            embedder.clone(),
            generator.clone(),
            Arc::new(FixedStore { candidates }),
            Arc::new(MemoryCache::new()),
            RetrievalConfig::default(),
            status,
        );
        Fixture {
            embedder,
            generator,
            orchestrator,
        }
    }

    #[tokio::test]
    async fn repeated_query_is_served_from_cache() {
        let f = fixture(vec![candidate("Chips", 0.9)], StoreStatus::Available, false);
        let history = vec![ChatTurn::user("hello")];

        let first = f.orchestrator.answer("latest tech news", &history).await.unwrap();
        assert!(!first.from_cache);

        let second = f.orchestrator.answer("latest tech news", &history).await.unwrap();
        assert!(second.from_cache);
        assert_eq!(second.text, first.text);
        assert_eq!(f.embedder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(f.generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn changed_history_invalidates_the_cache() {
        let f = fixture(vec![candidate("Chips", 0.9)], StoreStatus::Available, false);

        let history = vec![ChatTurn::user("hello")];
        f.orchestrator.answer("latest tech news", &history).await.unwrap();

        let extended = vec![ChatTurn::user("hello"), ChatTurn::assistant("hi there")];
        let second = f.orchestrator.answer("latest tech news", &extended).await.unwrap();
        assert!(!second.from_cache);
        assert_eq!(f.generator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unavailable_store_short_circuits_before_any_provider_call() {
        let f = fixture(vec![candidate("Chips", 0.9)], StoreStatus::Unavailable, false);

        let outcome = f.orchestrator.answer("anything", &[]).await.unwrap();
        assert_eq!(outcome.text, UNAVAILABLE_NOTICE);
        assert!(outcome.sources.is_empty());
        assert_eq!(outcome.candidate_count, 0);
        assert_eq!(f.embedder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(f.generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn no_candidates_still_generates_but_is_not_cached() {
        let f = fixture(Vec::new(), StoreStatus::Available, false);

        let first = f.orchestrator.answer("obscure question", &[]).await.unwrap();
        assert_eq!(first.candidate_count, 0);
        assert!(first.sources.is_empty());
        assert!(!first.from_cache);

        let second = f.orchestrator.answer("obscure question", &[]).await.unwrap();
        assert!(!second.from_cache);
        assert_eq!(f.generator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn below_threshold_candidates_never_surface() {
        let f = fixture(
            vec![candidate("Relevant", 0.85), candidate("Marginal", 0.4)],
            StoreStatus::Available,
            false,
        );

        let outcome = f.orchestrator.answer("query", &[]).await.unwrap();
        assert_eq!(outcome.candidate_count, 1);
        assert_eq!(outcome.sources[0].title, "Relevant");
    }

    #[tokio::test]
    async fn generation_failure_degrades_to_apology_with_sources_kept() {
        let f = fixture(vec![candidate("Chips", 0.9)], StoreStatus::Available, true);

        let outcome = f.orchestrator.answer("query", &[]).await.unwrap();
        assert_eq!(outcome.text, GENERATION_APOLOGY);
        assert_eq!(outcome.sources.len(), 1);
        assert_eq!(outcome.candidate_count, 1);

        // The apology must not be cached: the next call retries.
        let again = f.orchestrator.answer("query", &[]).await.unwrap();
        assert!(!again.from_cache);
    }

    #[tokio::test]
    async fn embedding_failure_propagates() {
        let orchestrator = RetrievalOrchestrator::new(
            Arc::new(FailingEmbedder),
            Arc::new(CountingGenerator::default()),
            Arc::new(FixedStore { candidates: vec![] }),
            Arc::new(MemoryCache::new()),
            RetrievalConfig::default(),
            StoreStatus::Available,
        );

        let result = orchestrator.answer("query", &[]).await;
        assert!(matches!(result, Err(Error::Embedding(_))));
    }

    #[tokio::test]
    async fn broken_cache_never_fails_the_query() {
        let orchestrator = RetrievalOrchestrator::new(
            Arc::new(CountingEmbedder::default()),
            Arc::new(CountingGenerator::default()),
            Arc::new(FixedStore {
                candidates: vec![candidate("Chips", 0.9)],
            }),
            Arc::new(BrokenCache),
            RetrievalConfig::default(),
            StoreStatus::Available,
        );

        let outcome = orchestrator.answer("query", &[]).await.unwrap();
        assert!(!outcome.from_cache);
        assert_eq!(outcome.candidate_count, 1);
    }
}
