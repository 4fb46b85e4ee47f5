// crates/server/src/routes/logs.rs
//! Monitor logs, cron jobs and the command log.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use openclaw_dash_core::aggregator::DEFAULT_COMMANDS_LIMIT;
use openclaw_dash_core::{CronJob, LogEvent};
use serde::Deserialize;
use serde_json::Value;

use super::parse_limit;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CommandsQuery {
    pub limit: Option<String>,
}

/// GET /api/health - Health monitor events, newest first.
pub async fn get_health(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<LogEvent>>> {
    Ok(Json(state.aggregate(|agg| agg.health_events()).await?))
}

/// GET /api/usage - Usage monitor events, newest first.
pub async fn get_usage(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<LogEvent>>> {
    Ok(Json(state.aggregate(|agg| agg.usage_events()).await?))
}

/// GET /api/cron - Cron jobs, each with its most recent runs oldest first.
pub async fn get_cron(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<CronJob>>> {
    Ok(Json(state.aggregate(|agg| agg.cron_jobs()).await?))
}

/// GET /api/commands - The last `limit` command log records (default 100).
pub async fn get_commands(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CommandsQuery>,
) -> ApiResult<Json<Vec<Value>>> {
    let limit = parse_limit(query.limit.as_deref(), DEFAULT_COMMANDS_LIMIT);
    Ok(Json(state.aggregate(move |agg| agg.commands(limit)).await?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(get_health))
        .route("/usage", get(get_usage))
        .route("/cron", get(get_cron))
        .route("/commands", get(get_commands))
}
