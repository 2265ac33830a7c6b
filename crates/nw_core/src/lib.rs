pub mod config;
pub mod error;
pub mod providers;
pub mod storage;
pub mod types;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

pub use config::{ContentLimits, IngestConfig, RetrievalConfig, SourceConfig, ThrottlePolicy};
pub use providers::{EmbeddingProvider, GenerationProvider};
pub use storage::{cosine_similarity, AnswerCache, ArticleStore};
pub use types::{
    Article, CachedAnswer, ChatOutcome, ChatTurn, IngestReport, Role, ScoredArticle, StoreStats,
    StoreStatus,
};
