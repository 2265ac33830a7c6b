use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One configured feed source. The orchestrator takes an ordered list of
/// these instead of a baked-in source table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub url: String,
    pub category: String,
    pub region: String,
}

/// Length bounds applied to normalized article content.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContentLimits {
    pub min_len: usize,
    pub max_len: usize,
}

impl Default for ContentLimits {
    fn default() -> Self {
        Self {
            min_len: 200,
            max_len: 4000,
        }
    }
}

/// Inter-request delay policy. Sequential ingestion waits through this
/// between sources and between embedding batches; tests use `None` to run
/// without wall-clock delays.
#[derive(Debug, Clone, Copy, Default)]
pub enum ThrottlePolicy {
    #[default]
    None,
    Fixed(Duration),
}

impl ThrottlePolicy {
    pub async fn wait(&self) {
        match self {
            ThrottlePolicy::None => {}
            ThrottlePolicy::Fixed(delay) => tokio::time::sleep(*delay).await,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub sources: Vec<SourceConfig>,
    /// Per-source item cap: only the first K feed items are considered.
    pub max_items_per_source: usize,
    pub limits: ContentLimits,
    /// Minimum extracted length for a secondary-fetch candidate to win.
    pub min_extract_len: usize,
    pub embed_batch_size: usize,
    pub throttle: ThrottlePolicy,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            max_items_per_source: 20,
            limits: ContentLimits::default(),
            min_extract_len: 200,
            embed_batch_size: 8,
            throttle: ThrottlePolicy::Fixed(Duration::from_secs(2)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Top-K nearest vectors requested from the store.
    pub top_k: usize,
    /// Hard relevance gate: candidates below this cosine similarity are
    /// excluded, not merely ranked low.
    pub score_threshold: f32,
    pub cache_ttl: Duration,
    /// Trailing turns folded into the cache fingerprint.
    pub fingerprint_turns: usize,
    /// Trailing turns included in the generation prompt.
    pub prompt_turns: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            score_threshold: 0.7,
            cache_ttl: Duration::from_secs(30 * 60),
            fingerprint_turns: 3,
            prompt_turns: 5,
        }
    }
}
