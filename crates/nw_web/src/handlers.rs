use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use tracing::error;

use nw_core::{ChatOutcome, ChatTurn, StoreStats, StoreStatus};
use nw_retrieval::GENERATION_APOLOGY;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    match state
        .orchestrator
        .answer(&request.message, &request.history)
        .await
    {
        Ok(outcome) => Json(outcome),
        // Nothing crosses the transport layer unhandled: pipeline errors
        // become the fixed apology with empty sources.
        Err(e) => {
            error!("chat pipeline failed: {}", e);
            Json(ChatOutcome {
                text: GENERATION_APOLOGY.to_string(),
                sources: Vec::new(),
                from_cache: false,
                candidate_count: 0,
            })
        }
    }
}

pub async fn stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.stats().await {
        Ok(stats) => Json(stats),
        Err(e) => {
            error!("stats lookup failed: {}", e);
            Json(StoreStats {
                count: 0,
                status: StoreStatus::Unavailable,
            })
        }
    }
}
