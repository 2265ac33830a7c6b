use std::sync::Arc;

use nw_core::{ArticleStore, Error, Result};

pub mod backends;
pub mod cache;

pub use backends::MemoryStore;
#[cfg(feature = "qdrant")]
pub use backends::QdrantStore;
pub use cache::MemoryCache;

pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";
pub const DEFAULT_COLLECTION: &str = "articles";

/// Backend factory keyed by CLI/config name. The qdrant arm only exists
/// when the crate is built with the `qdrant` feature.
pub async fn create_store(
    kind: &str,
    url: Option<&str>,
    dimension: usize,
) -> Result<Arc<dyn ArticleStore>> {
    match kind {
        "memory" => {
            let _ = (url, dimension);
            Ok(Arc::new(MemoryStore::new()))
        }
        #[cfg(feature = "qdrant")]
        "qdrant" => {
            let store = QdrantStore::connect(
                url.unwrap_or(DEFAULT_QDRANT_URL),
                DEFAULT_COLLECTION,
                dimension as u64,
            )
            .await?;
            Ok(Arc::new(store))
        }
        other => Err(Error::Storage(format!("unknown storage backend: {}", other))),
    }
}
