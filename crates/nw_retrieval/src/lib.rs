pub mod context;
pub mod fingerprint;
pub mod orchestrator;

pub use fingerprint::query_fingerprint;
pub use orchestrator::{RetrievalOrchestrator, GENERATION_APOLOGY, UNAVAILABLE_NOTICE};

pub mod prelude {
    pub use super::orchestrator::RetrievalOrchestrator;
    pub use nw_core::{ChatOutcome, ChatTurn, Error, Result, RetrievalConfig, StoreStatus};
}
