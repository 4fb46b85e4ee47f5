// crates/server/src/routes/overview.rs
//! Dashboard overview endpoint.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use openclaw_dash_core::Overview;

use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/overview - Agents with stats, monitor states, totals and the
/// cron summary in one payload.
pub async fn get_overview(State(state): State<Arc<AppState>>) -> ApiResult<Json<Overview>> {
    let overview = state.aggregate(|agg| agg.overview()).await?;
    Ok(Json(overview))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/overview", get(get_overview))
}
