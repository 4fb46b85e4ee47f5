// crates/server/src/routes/sessions.rs
//! Session listing across all agents.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use openclaw_dash_core::Session;

use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/sessions - Every agent's sessions, newest first.
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Session>>> {
    Ok(Json(state.aggregate(|agg| agg.all_sessions()).await?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/sessions", get(list_sessions))
}
