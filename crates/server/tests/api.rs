//! End-to-end tests for the `/api` surface over a fixture state directory.
//!
//! Each test builds a throwaway OpenClaw root with `tempfile`, wires it into
//! the real router with a fixed clock, and drives requests with `oneshot`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use openclaw_dash_core::{Aggregator, ManualClock, StateLayout};
use openclaw_dash_server::notifier::{NotifierHub, NotifyBackend, NullBackend, WatchBackend};
use openclaw_dash_server::{create_app, AppState};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio_stream::StreamExt;
use tower::ServiceExt;

// 2024-06-15T12:00:00Z
const NOW: i64 = 1_718_452_800_000;
const DAY: i64 = 86_400_000;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

fn populate(root: &Path) {
    write(
        root,
        "openclaw.json",
        &json!({"agents": {"list": [
            {"id": "main", "name": "Main", "identity": {"name": "Main", "theme": "blue", "emoji": "\u{1f9e0}"}},
            {"id": "amir", "name": "Amir"}
        ]}})
        .to_string(),
    );
    write(
        root,
        "agents/main/sessions/sessions.json",
        &json!({
            "agent:main:telegram": {
                "sessionId": "s-main-1", "updatedAt": NOW - DAY, "channel": "telegram",
                "model": "claude-opus", "inputTokens": 100, "outputTokens": 50, "totalTokens": 150
            },
            "agent:main:old": {
                "sessionId": "s-main-2", "updatedAt": NOW - 45 * DAY, "model": "claude-opus",
                "totalTokens": 1000
            }
        })
        .to_string(),
    );
    write(
        root,
        "agents/amir/sessions/sessions.json",
        &json!({
            "agent:amir:wa": {
                "sessionId": "s-amir-1", "updatedAt": NOW - 1000, "lastChannel": "whatsapp",
                "model": "claude-sonnet", "totalTokens": 300
            }
        })
        .to_string(),
    );
    write(
        root,
        "agents/main/sessions/s-main-1.jsonl",
        &[
            json!({"type": "session", "id": "s-main-1"}),
            json!({"type": "message", "id": "m1", "timestamp": "2024-06-14T12:00:00Z",
                   "message": {"role": "user", "content": [{"type": "text", "text": "status?"}]}}),
            json!({"type": "message", "id": "m2",
                   "message": {"role": "assistant", "content": [
                       {"type": "toolCall", "name": "exec"},
                       {"type": "text", "text": "all green"}
                   ]}}),
        ]
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join("\n"),
    );
    write(root, "healthcheck.state", "warning\n");
    write(
        root,
        "healthcheck.log",
        "2024-06-15 10:00:00 UTC INFO: all good\n\n2024-06-15 11:00:00 UTC ERROR: disk full\nnot a log line\n",
    );
    write(
        root,
        "cron/jobs.json",
        &json!({"jobs": [
            {"id": "nightly", "agentId": "main", "name": "Nightly digest", "enabled": true,
             "schedule": {"kind": "cron", "expr": "0 3 * * *", "tz": "UTC"},
             "delivery": {"mode": "announce", "channel": "telegram", "to": "@ops"},
             "state": {"lastStatus": "ok", "lastDurationMs": 1200}},
            {"id": "poll", "enabled": false, "schedule": {"kind": "every", "everyMs": 60000}}
        ]})
        .to_string(),
    );
    write(
        root,
        "cron/runs/nightly.jsonl",
        "{\"ts\":1,\"status\":\"ok\"}\n{broken\n{\"ts\":2,\"status\":\"error\",\"summary\":\"timeout\"}\n",
    );
    let commands: String = (0..120)
        .map(|i| format!("{{\"seq\":{i},\"cmd\":\"status\"}}\n"))
        .collect();
    write(root, "logs/commands.log", &commands);
}

struct Fixture {
    dir: TempDir,
    state: Arc<AppState>,
    app: Router,
}

fn build(token: Option<&str>, watch: impl FnOnce(Arc<Aggregator>) -> Arc<dyn WatchBackend>) -> Fixture {
    let dir = TempDir::new().unwrap();
    populate(dir.path());
    let clock = Arc::new(ManualClock::new(NOW));
    let aggregator = Arc::new(Aggregator::with_clock(StateLayout::new(dir.path()), clock));
    let state = AppState::new(
        aggregator.clone(),
        NotifierHub::new(watch(aggregator)),
        token.map(str::to_string),
        Duration::from_secs(30),
    );
    let app = create_app(state.clone(), None);
    Fixture {
        dir,
        state,
        app,
    }
}

fn fixture_with_token(token: Option<&str>) -> Fixture {
    build(token, |_| Arc::new(NullBackend))
}

fn fixture() -> Fixture {
    fixture_with_token(None)
}

/// Like [`fixture`], but `/api/sse` watches the fixture directory for real.
fn watched_fixture() -> Fixture {
    build(None, |aggregator| Arc::new(NotifyBackend::new(aggregator, Vec::new())))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn test_overview() {
    let f = fixture();
    let (status, body) = get(f.app, "/api/overview").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["health"], json!({"state": "warning"}));
    assert_eq!(body["usage"], json!({"state": "ok"}));
    assert_eq!(
        body["totals"],
        json!({"tokens": 1450, "monthlyTokens": 450, "sessions": 3})
    );
    assert_eq!(body["cronSummary"], json!({"total": 2, "enabled": 1}));
    assert_eq!(body["agents"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_agents_list_carries_stats_and_identity() {
    let f = fixture();
    let (status, body) = get(f.app, "/api/agents").await;

    assert_eq!(status, StatusCode::OK);
    let main = &body[0];
    assert_eq!(main["id"], "main");
    assert_eq!(main["identity"]["theme"], "blue");
    assert_eq!(main["stats"]["sessionCount"], 2);
    assert_eq!(main["stats"]["totalTokens"], 1150);
    assert_eq!(main["stats"]["monthlyTokens"], 150);
    assert_eq!(main["stats"]["lastActive"], NOW - DAY);

    let amir = &body[1];
    assert_eq!(amir["identity"], json!({"name": "Amir", "theme": "gray", "emoji": "\u{1f916}"}));
}

#[tokio::test]
async fn test_agent_detail_and_not_found() {
    let f = fixture();

    let (status, body) = get(f.app.clone(), "/api/agents/main").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Main");
    assert_eq!(body["stats"]["totalInput"], 100);
    let keys: Vec<&str> = body["sessions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["sessionKey"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["agent:main:telegram", "agent:main:old"]);

    let (status, body) = get(f.app, "/api/agents/ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Agent not found");
}

#[tokio::test]
async fn test_session_transcript() {
    let f = fixture();

    let (status, body) = get(f.app.clone(), "/api/agents/main/sessions/s-main-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["messages"],
        json!([
            {"id": "m1", "timestamp": "2024-06-14T12:00:00Z", "role": "user", "content": "status?"},
            {"id": "m2", "timestamp": null, "role": "assistant", "content": "[toolCall]all green"}
        ])
    );

    let (_, body) = get(f.app.clone(), "/api/agents/main/sessions/s-main-1?limit=1").await;
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    assert_eq!(body["messages"][0]["id"], "m2");

    let (status, body) = get(f.app, "/api/agents/main/sessions/nope?limit=abc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"messages": []}));
}

#[tokio::test]
async fn test_health_and_usage_logs() {
    let f = fixture();

    let (status, body) = get(f.app.clone(), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"timestamp": "", "level": "INFO", "message": "not a log line"},
            {"timestamp": "2024-06-15 11:00:00 UTC", "level": "ERROR", "message": "disk full"},
            {"timestamp": "2024-06-15 10:00:00 UTC", "level": "INFO", "message": "all good"}
        ])
    );

    let (status, body) = get(f.app, "/api/usage").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_cron_jobs_with_runs() {
    let f = fixture();
    let (status, body) = get(f.app, "/api/cron").await;

    assert_eq!(status, StatusCode::OK);
    let nightly = &body[0];
    assert_eq!(nightly["name"], "Nightly digest");
    assert_eq!(nightly["schedule"]["expr"], "0 3 * * *");
    assert_eq!(nightly["delivery"]["to"], "@ops");
    assert_eq!(nightly["state"]["lastDurationMs"], 1200);
    let run_ts: Vec<i64> = nightly["runs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["ts"].as_i64().unwrap())
        .collect();
    assert_eq!(run_ts, vec![1, 2]);

    assert_eq!(body[1]["schedule"]["everyMs"], 60000);
    assert_eq!(body[1]["runs"], json!([]));
}

#[tokio::test]
async fn test_commands_limit() {
    let f = fixture();

    let (_, body) = get(f.app.clone(), "/api/commands").await;
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 100);
    assert_eq!(records[0]["seq"], 20);
    assert_eq!(records[99]["seq"], 119);

    let (_, body) = get(f.app.clone(), "/api/commands?limit=3").await;
    let seqs: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["seq"].as_i64().unwrap())
        .collect();
    assert_eq!(seqs, vec![117, 118, 119]);

    let (_, body) = get(f.app.clone(), "/api/commands?limit=0").await;
    assert_eq!(body.as_array().unwrap().len(), 100);

    let (status, body) = get(f.app, &format!("/api/commands?limit={}", usize::MAX)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 120);
}

#[tokio::test]
async fn test_all_sessions_sorted_across_agents() {
    let f = fixture();
    let (status, body) = get(f.app, "/api/sessions").await;

    assert_eq!(status, StatusCode::OK);
    let order: Vec<(&str, &str)> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| (s["agentId"].as_str().unwrap(), s["sessionId"].as_str().unwrap()))
        .collect();
    assert_eq!(
        order,
        vec![("amir", "s-amir-1"), ("main", "s-main-1"), ("main", "s-main-2")]
    );
    assert_eq!(body[0]["channel"], "whatsapp");
}

#[tokio::test]
async fn test_token_usage() {
    let f = fixture();
    let (status, body) = get(f.app, "/api/token-usage").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalTokens"], 1450);
    assert_eq!(body["monthlyTokens"], 450);
    assert_eq!(body["totalSessions"], 3);
    assert_eq!(body["byModel"][0], json!({"model": "claude-opus", "totalTokens": 1150, "sessionCount": 2}));
    assert_eq!(body["byAgent"][0]["agentId"], "main");

    let daily = body["daily"].as_array().unwrap();
    assert_eq!(daily.len(), 30);
    assert_eq!(daily[29], json!({"date": "2024-06-15", "tokens": 300}));
    assert_eq!(daily[28], json!({"date": "2024-06-14", "tokens": 150}));
}

#[tokio::test]
async fn test_open_api_ignores_query_shape() {
    let f = fixture();
    let (status, body) = get(f.app, "/api/commands?token=a&token=b&limit=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_token_required_when_configured() {
    let f = fixture_with_token(Some("s3cret"));

    let (status, body) = get(f.app.clone(), "/api/overview").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Unauthorized"}));

    let (status, _) = get(f.app.clone(), "/api/overview?token=wrong").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get(f.app.clone(), "/api/overview?token=s3cret").await;
    assert_eq!(status, StatusCode::OK);

    let request = Request::builder()
        .uri("/api/agents")
        .header(header::AUTHORIZATION, "Bearer s3cret")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(f.app, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_sse_connected_then_change_events() {
    let f = watched_fixture();
    let response = f
        .app
        .oneshot(Request::builder().uri("/api/sse").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );
    assert_eq!(f.state.notifier.subscriber_count(), 1);

    let mut body = response.into_body().into_data_stream();
    let first = body.next().await.unwrap().unwrap();
    assert_eq!(
        String::from_utf8(first.to_vec()).unwrap(),
        "data: {\"type\":\"connected\"}\n\n"
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    write(f.dir.path(), "cron/jobs.json", "{\"jobs\":[]}");
    let second = tokio::time::timeout(Duration::from_secs(5), body.next())
        .await
        .expect("no change frame within 5s")
        .unwrap()
        .unwrap();
    assert_eq!(
        String::from_utf8(second.to_vec()).unwrap(),
        "data: {\"type\":\"file-change\",\"file\":\"cron/jobs.json\"}\n\n"
    );

    drop(body);
    assert_eq!(f.state.notifier.subscriber_count(), 0);
}
