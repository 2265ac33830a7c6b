use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A normalized, length-bounded news article ready for embedding.
///
/// `id` is content-addressed: derived from the article's first stable
/// natural key (url, guid or title), so re-ingesting an unchanged feed
/// item always produces the same id and the upsert replaces rather than
/// duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub content: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub source: String,
    pub category: String,
    pub tags: BTreeSet<String>,
    pub word_count: usize,
}

/// A search candidate: an article plus its cosine similarity to the query.
/// Ephemeral, produced per query and discarded after response assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredArticle {
    pub article: Article,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of conversation history. Consumed read-only: the pipeline only
/// looks at the trailing turns to build fingerprints and prompt context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Result of one query through the retrieval pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutcome {
    pub text: String,
    pub sources: Vec<Article>,
    pub from_cache: bool,
    pub candidate_count: usize,
}

/// A generated answer held by the cache store under a query fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedAnswer {
    pub text: String,
    pub sources: Vec<Article>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Available,
    Unavailable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub count: usize,
    pub status: StoreStatus,
}

/// Aggregate statistics for one ingestion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    pub collected: usize,
    pub stored: usize,
    pub skipped_sources: usize,
    pub categories: BTreeSet<String>,
    pub regions: BTreeSet<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_turn_constructors_set_role() {
        assert_eq!(ChatTurn::user("hi").role, Role::User);
        assert_eq!(ChatTurn::assistant("hello").role, Role::Assistant);
    }

    #[test]
    fn article_serde_round_trip() {
        let article = Article {
            id: "abc123".to_string(),
            title: "Test Article".to_string(),
            content: "Some content.".to_string(),
            url: "http://test.com/a".to_string(),
            published_at: Utc::now(),
            source: "test".to_string(),
            category: "tech".to_string(),
            tags: BTreeSet::from(["ai".to_string()]),
            word_count: 2,
        };
        let json = serde_json::to_string(&article).unwrap();
        let back: Article = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, article.id);
        assert_eq!(back.tags, article.tags);
    }
}
