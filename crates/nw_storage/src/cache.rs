use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use nw_core::{AnswerCache, CachedAnswer, Result};

struct CacheEntry {
    answer: CachedAnswer,
    expires_at: Instant,
}

/// In-memory TTL cache for generated answers. Expired entries are dropped
/// on read and by `purge_expired`; there is no background sweeper.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let now = Instant::now();
        entries.retain(|_, e| e.expires_at > now);
        before - entries.len()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnswerCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<CachedAnswer>> {
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.answer.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, answer: CachedAnswer, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                answer,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(text: &str) -> CachedAnswer {
        CachedAnswer {
            text: text.to_string(),
            sources: Vec::new(),
        }
    }

    #[tokio::test]
    async fn round_trip_within_ttl() {
        let cache = MemoryCache::new();
        cache
            .put("k1", answer("hello"), Duration::from_secs(60))
            .await
            .unwrap();
        let hit = cache.get("k1").await.unwrap().unwrap();
        assert_eq!(hit.text, "hello");
    }

    #[tokio::test]
    async fn expired_entry_reads_as_miss() {
        let cache = MemoryCache::new();
        cache
            .put("k1", answer("stale"), Duration::from_secs(0))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(cache.get("k1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_overwrites_existing_entry() {
        let cache = MemoryCache::new();
        cache.put("k1", answer("old"), Duration::from_secs(60)).await.unwrap();
        cache.put("k1", answer("new"), Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("k1").await.unwrap().unwrap().text, "new");
    }

    #[tokio::test]
    async fn clear_empties_everything() {
        let cache = MemoryCache::new();
        cache.put("k1", answer("a"), Duration::from_secs(60)).await.unwrap();
        cache.clear().await;
        assert!(cache.get("k1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn purge_drops_only_expired_entries() {
        let cache = MemoryCache::new();
        cache.put("old", answer("a"), Duration::from_secs(0)).await.unwrap();
        cache.put("live", answer("b"), Duration::from_secs(60)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert_eq!(cache.purge_expired().await, 1);
        assert!(cache.get("live").await.unwrap().is_some());
    }
}
