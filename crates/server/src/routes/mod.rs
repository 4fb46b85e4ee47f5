//! API route handlers for the dashboard server.

pub mod agents;
pub mod logs;
pub mod overview;
pub mod sessions;
pub mod stream;
pub mod tokens;

use std::sync::Arc;

use axum::{middleware, Router};

use crate::auth::require_token;
use crate::state::AppState;

/// Create the combined API router with all routes under /api prefix.
///
/// Routes:
/// - GET /api/overview - Agents with stats, monitor states, totals, cron summary
/// - GET /api/agents - Agents with stats
/// - GET /api/agents/{id} - One agent with stats and sessions (404 if unknown)
/// - GET /api/agents/{id}/sessions/{sid}?limit=N - Session transcript tail
/// - GET /api/health - Health monitor log events, newest first
/// - GET /api/usage - Usage monitor log events, newest first
/// - GET /api/cron - Cron jobs with their recent runs
/// - GET /api/commands?limit=N - Tail of the command log
/// - GET /api/sessions - Every agent's sessions, newest first
/// - GET /api/token-usage - Token rollup by model, agent and day
/// - GET /api/sse - Server-sent change events
pub fn api_routes(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(overview::router())
        .merge(agents::router())
        .merge(logs::router())
        .merge(sessions::router())
        .merge(tokens::router())
        .merge(stream::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new().nest("/api", api).with_state(state)
}

/// Parse a `?limit=` value; anything that is not a positive integer falls
/// back to `default`.
pub(crate) fn parse_limit(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|limit| *limit > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None, 50), 50);
        assert_eq!(parse_limit(Some("10"), 50), 10);
        assert_eq!(parse_limit(Some("0"), 50), 50);
        assert_eq!(parse_limit(Some("-3"), 50), 50);
        assert_eq!(parse_limit(Some("lots"), 100), 100);
    }
}
