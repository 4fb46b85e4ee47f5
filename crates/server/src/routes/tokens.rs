// crates/server/src/routes/tokens.rs
use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use openclaw_dash_core::TokenUsage;

use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/token-usage - Token totals by model, agent and UTC day.
pub async fn get_token_usage(State(state): State<Arc<AppState>>) -> ApiResult<Json<TokenUsage>> {
    Ok(Json(state.aggregate(|agg| agg.token_usage()).await?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/token-usage", get(get_token_usage))
}
