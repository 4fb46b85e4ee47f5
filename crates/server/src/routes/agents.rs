// crates/server/src/routes/agents.rs
//! Agent roster, agent detail and session transcript endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use openclaw_dash_core::aggregator::DEFAULT_TRANSCRIPT_LIMIT;
use openclaw_dash_core::{AgentDetail, AgentWithStats, TranscriptMessage};
use serde::{Deserialize, Serialize};

use super::parse_limit;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TranscriptQuery {
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub messages: Vec<TranscriptMessage>,
}

/// GET /api/agents - Every configured agent with its stats.
pub async fn list_agents(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<AgentWithStats>>> {
    let agents = state.aggregate(|agg| agg.agents_with_stats()).await?;
    Ok(Json(agents))
}

/// GET /api/agents/{id} - One agent with stats and sessions.
pub async fn get_agent(
    State(state): State<Arc<AppState>>,
    Path(agent_id): Path<String>,
) -> ApiResult<Json<AgentDetail>> {
    let detail = state
        .aggregate(move |agg| agg.agent_detail(&agent_id))
        .await??;
    Ok(Json(detail))
}

/// GET /api/agents/{id}/sessions/{sid} - The last `limit` messages of a
/// session transcript (default 50). Unknown sessions yield no messages.
pub async fn get_session_transcript(
    State(state): State<Arc<AppState>>,
    Path((agent_id, session_id)): Path<(String, String)>,
    Query(query): Query<TranscriptQuery>,
) -> ApiResult<Json<TranscriptResponse>> {
    let limit = parse_limit(query.limit.as_deref(), DEFAULT_TRANSCRIPT_LIMIT);
    let messages = state
        .aggregate(move |agg| agg.session_transcript(&agent_id, &session_id, limit))
        .await?;
    Ok(Json(TranscriptResponse { messages }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/agents", get(list_agents))
        .route("/agents/{id}", get(get_agent))
        .route("/agents/{id}/sessions/{sid}", get(get_session_transcript))
}
