use std::sync::Arc;

use nw_core::ArticleStore;
use nw_retrieval::RetrievalOrchestrator;

pub struct AppState {
    pub orchestrator: RetrievalOrchestrator,
    pub store: Arc<dyn ArticleStore>,
}
