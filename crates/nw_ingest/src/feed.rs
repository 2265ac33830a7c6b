use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;
use url::Url;

use nw_core::{Error, Result};

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = concat!("nw/", env!("CARGO_PKG_VERSION"));

/// One entry of a fetched feed, before normalization.
#[derive(Debug, Clone)]
pub struct FeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub guid: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub content: Option<String>,
}

/// Boundary to the outside world: feed documents and article pages.
/// Tests substitute a canned implementation so the pipeline runs without
/// network access.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch_feed(&self, url: &str) -> Result<Vec<FeedItem>>;

    async fn fetch_page(&self, url: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    guid: Option<Guid>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    // <content:encoded> carries the full body on feeds that provide one.
    #[serde(rename = "content:encoded", alias = "encoded")]
    encoded: Option<String>,
}

// <guid isPermaLink="false">…</guid> — attributes must not break parsing.
#[derive(Debug, Deserialize)]
struct Guid {
    #[serde(rename = "$text")]
    value: Option<String>,
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn resolve_link(base: &str, link: &str) -> Option<String> {
    match Url::parse(link) {
        Ok(url) => Some(url.to_string()),
        Err(_) => Url::parse(base)
            .ok()?
            .join(link)
            .ok()
            .map(|u| u.to_string()),
    }
}

/// Parse an RSS 2.0 document into feed items. Relative item links are
/// resolved against the feed URL.
pub fn parse_feed(xml: &str, feed_url: &str) -> Result<Vec<FeedItem>> {
    let rss: Rss =
        from_str(xml).map_err(|e| Error::Feed(format!("unparseable feed {}: {}", feed_url, e)))?;

    let items = rss
        .channel
        .items
        .into_iter()
        .map(|item| FeedItem {
            link: item
                .link
                .as_deref()
                .and_then(|l| resolve_link(feed_url, l.trim())),
            guid: item.guid.and_then(|g| g.value),
            published_at: item.pub_date.as_deref().and_then(parse_date),
            content: item.encoded.or(item.description),
            title: item.title,
        })
        .collect();

    Ok(items)
}

/// HTTP implementation used in production: one client for feed documents
/// and secondary article-page fetches, with a bounded per-request timeout.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch_feed(&self, url: &str) -> Result<Vec<FeedItem>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Feed(format!("unreachable feed {}: {}", url, e)))?;
        let body = response
            .text()
            .await
            .map_err(|e| Error::Feed(format!("unreadable feed {}: {}", url, e)))?;
        parse_feed(&body, url)
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        Ok(response.text().await?)
    }
}
