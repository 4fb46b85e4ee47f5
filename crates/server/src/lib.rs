// crates/server/src/lib.rs
//! OpenClaw dashboard server library.
//!
//! Axum HTTP server exposing the read-only aggregation views as JSON under
//! `/api`, a server-sent event stream of state directory changes, and
//! optionally the built frontend.

pub mod auth;
pub mod config;
pub mod error;
pub mod notifier;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::*;
pub use routes::api_routes;
pub use state::AppState;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Create the Axum application with all routes and middleware.
///
/// This sets up:
/// - API routes under `/api` (token-checked when a token is configured)
/// - The frontend from `static_dir`, with unknown paths served `index.html`
/// - CORS (allows any origin)
/// - Request tracing
pub fn create_app(state: Arc<AppState>, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new().merge(api_routes(state));

    if let Some(dir) = static_dir {
        let index = dir.join("index.html");
        app = app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    app.layer(cors).layer(TraceLayer::new_for_http())
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::{NotifierHub, NullBackend};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use openclaw_dash_core::{Aggregator, StateLayout};
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_state(root: &std::path::Path) -> Arc<AppState> {
        AppState::new(
            Arc::new(Aggregator::new(StateLayout::new(root))),
            NotifierHub::new(Arc::new(NullBackend)),
            None,
            Duration::from_secs(30),
        )
    }

    /// Helper to make a GET request to the app.
    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_str = String::from_utf8(body.to_vec()).unwrap();

        (status, body_str)
    }

    #[tokio::test]
    async fn test_api_only_mode_has_no_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_app(test_state(dir.path()), None);

        let (status, _) = get(app, "/dashboard").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_static_files_with_spa_fallback() {
        let state_dir = tempfile::tempdir().unwrap();
        let static_dir = tempfile::tempdir().unwrap();
        std::fs::write(static_dir.path().join("index.html"), "<html>dash</html>").unwrap();
        std::fs::write(static_dir.path().join("app.js"), "console.log(1)").unwrap();

        let app = create_app(
            test_state(state_dir.path()),
            Some(static_dir.path().to_path_buf()),
        );

        let (status, body) = get(app.clone(), "/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "console.log(1)");

        let (status, body) = get(app.clone(), "/agents/main").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<html>dash</html>");

        // API routes win over the fallback.
        let (status, body) = get(app, "/api/agents").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "[]");
    }

    #[tokio::test]
    async fn test_cors_headers_present() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_app(test_state(dir.path()), None);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/overview")
                    .header("Origin", "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }
}
