pub mod extract;
pub mod feed;
pub mod identity;
pub mod normalize;
pub mod pipeline;
pub mod tags;

pub use extract::{default_strategies, extract_body, ExtractionStrategy};
pub use feed::{FeedItem, HttpFetcher, SourceFetcher};
pub use identity::derive_id;
pub use pipeline::IngestionPipeline;

pub mod prelude {
    pub use super::feed::{FeedItem, SourceFetcher};
    pub use super::pipeline::IngestionPipeline;
    pub use nw_core::{Article, Error, Result};
}
