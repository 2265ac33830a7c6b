use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use nw_core::{Article, ArticleStore, EmbeddingProvider, Error, IngestConfig, IngestReport, Result, SourceConfig};

use crate::extract::{default_strategies, extract_body, ExtractionStrategy};
use crate::feed::{FeedItem, SourceFetcher};
use crate::identity::derive_id;
use crate::normalize::{is_acceptable, normalize, truncate};
use crate::tags::keyword_tags;

/// Drives one ingestion run: fetch feeds, normalize and deduplicate items,
/// embed the accepted articles in batches and upsert them into the store.
///
/// Sources are walked sequentially with a throttle wait between them; the
/// delay is the point, not an accident, so third-party feed servers and
/// the embedding provider stay within their rate limits.
pub struct IngestionPipeline {
    fetcher: Arc<dyn SourceFetcher>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn ArticleStore>,
    strategies: Vec<ExtractionStrategy>,
    config: IngestConfig,
}

impl IngestionPipeline {
    pub fn new(
        fetcher: Arc<dyn SourceFetcher>,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn ArticleStore>,
        config: IngestConfig,
    ) -> Self {
        Self {
            fetcher,
            embedder,
            store,
            strategies: default_strategies(),
            config,
        }
    }

    pub fn with_strategies(mut self, strategies: Vec<ExtractionStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// One full run over every configured source. A failing source is
    /// skipped, a failing item is dropped; neither aborts the run.
    pub async fn run(&self) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        let mut accepted: Vec<Article> = Vec::new();
        let mut seen_titles: HashSet<String> = HashSet::new();
        let mut seen_urls: HashSet<String> = HashSet::new();

        for (i, source) in self.config.sources.iter().enumerate() {
            if i > 0 {
                self.config.throttle.wait().await;
            }

            info!("📡 fetching source {} ({})", source.name, source.url);
            let items = match self.fetcher.fetch_feed(&source.url).await {
                Ok(items) => items,
                Err(e) => {
                    warn!("skipping source {}: {}", source.name, e);
                    report.skipped_sources += 1;
                    continue;
                }
            };

            for item in items.into_iter().take(self.config.max_items_per_source) {
                match self
                    .process_item(source, item, &mut seen_titles, &mut seen_urls)
                    .await
                {
                    Ok(Some(article)) => {
                        report.categories.insert(source.category.clone());
                        report.regions.insert(source.region.clone());
                        accepted.push(article);
                    }
                    Ok(None) => {}
                    Err(e) => debug!("dropping item from {}: {}", source.name, e),
                }
            }
        }

        report.collected = accepted.len();
        info!("🧺 collected {} articles, embedding in batches", report.collected);

        for (i, batch) in accepted.chunks(self.config.embed_batch_size).enumerate() {
            if i > 0 {
                self.config.throttle.wait().await;
            }
            for article in batch {
                let vector = match self.embedder.embed(&embedding_input(article)).await {
                    Ok(v) => v,
                    Err(e) => {
                        warn!("embedding failed for {}: {}", article.id, e);
                        continue;
                    }
                };
                match self.store.upsert(&article.id, &vector, article).await {
                    Ok(()) => report.stored += 1,
                    Err(e) => warn!("upsert failed for {}: {}", article.id, e),
                }
            }
        }

        info!(
            "📦 ingestion finished: {}/{} stored, {} sources skipped",
            report.stored, report.collected, report.skipped_sources
        );
        Ok(report)
    }

    /// Normalize one feed item into an `Article`, or drop it. `Ok(None)`
    /// is a silent drop (empty title, intra-run duplicate); `Err` carries
    /// the reason and is contained by the caller.
    async fn process_item(
        &self,
        source: &SourceConfig,
        item: FeedItem,
        seen_titles: &mut HashSet<String>,
        seen_urls: &mut HashSet<String>,
    ) -> Result<Option<Article>> {
        let title = normalize(item.title.as_deref().unwrap_or(""));
        if title.is_empty() {
            return Ok(None);
        }

        let min_len = self.config.limits.min_len;
        let mut content = normalize(item.content.as_deref().unwrap_or(""));

        // Feed body too thin: try the article page itself.
        if !is_acceptable(&content, min_len) {
            if let Some(link) = item.link.as_deref() {
                match self.fetcher.fetch_page(link).await {
                    Ok(html) => {
                        if let Some(body) =
                            extract_body(&html, &self.strategies, self.config.min_extract_len)
                        {
                            content = normalize(&body);
                        }
                    }
                    Err(e) => debug!("secondary fetch failed for {}: {}", link, e),
                }
            }
        }

        if !is_acceptable(&content, min_len) {
            return Err(Error::Content(format!(
                "'{}' below the {}-char minimum",
                title, min_len
            )));
        }

        let content = truncate(&content, self.config.limits.max_len);

        let Some(id) = derive_id(&[
            item.link.as_deref(),
            item.guid.as_deref(),
            Some(title.as_str()),
        ]) else {
            return Ok(None);
        };

        // Intra-run dedup: an item matching an already-accepted title or
        // URL is dropped.
        let title_key = title.to_lowercase();
        let url_key = item.link.clone();
        if seen_titles.contains(&title_key) {
            debug!("duplicate title in run: {}", title);
            return Ok(None);
        }
        if let Some(url) = url_key.as_deref() {
            if seen_urls.contains(url) {
                debug!("duplicate url in run: {}", url);
                return Ok(None);
            }
        }
        seen_titles.insert(title_key);
        if let Some(url) = url_key.clone() {
            seen_urls.insert(url);
        }

        let word_count = content.split_whitespace().count();
        Ok(Some(Article {
            id,
            tags: keyword_tags(&content),
            title,
            url: url_key.unwrap_or_default(),
            published_at: item.published_at.unwrap_or_else(Utc::now),
            source: source.name.clone(),
            category: source.category.clone(),
            word_count,
            content,
        }))
    }
}

fn embedding_input(article: &Article) -> String {
    format!("{}\n\n{}", article.title, article.content)
}
