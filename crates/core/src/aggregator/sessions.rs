//! Agent roster and session map derivation.

use serde_json::Value;

use crate::types::{Agent, AgentStats, Identity, Session};

/// Trailing window used for "monthly" figures.
pub const MONTH_WINDOW_MS: i64 = 30 * 24 * 60 * 60 * 1000;

/// Map `openclaw.json` to the agent roster. Entries without a string `id`
/// are skipped.
pub(crate) fn agents_from_config(config: &Value) -> Vec<Agent> {
    let Some(list) = config
        .get("agents")
        .and_then(|agents| agents.get("list"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    list.iter().filter_map(agent_from_entry).collect()
}

fn agent_from_entry(entry: &Value) -> Option<Agent> {
    let id = entry.get("id")?.as_str()?.to_string();
    let name = str_field(entry, "name").unwrap_or_else(|| id.clone());

    let identity = match entry.get("identity").filter(|v| v.is_object()) {
        Some(raw) => {
            let fallback = Identity::fallback(name.clone());
            Identity {
                name: str_field(raw, "name").unwrap_or(fallback.name),
                theme: str_field(raw, "theme").unwrap_or(fallback.theme),
                emoji: str_field(raw, "emoji").unwrap_or(fallback.emoji),
            }
        }
        None => Identity::fallback(name.clone()),
    };

    Some(Agent { id, name, identity })
}

/// Convert an agent's session map into sessions, newest first.
pub(crate) fn sessions_from_map(agent_id: &str, map: &Value) -> Vec<Session> {
    let Some(map) = map.as_object() else {
        return Vec::new();
    };

    let mut sessions: Vec<Session> = map
        .iter()
        .map(|(key, raw)| session_from_entry(agent_id, key, raw))
        .collect();
    sort_newest_first(&mut sessions);
    sessions
}

fn session_from_entry(agent_id: &str, key: &str, raw: &Value) -> Session {
    let display_name = str_field(raw, "displayName")
        .filter(|s| !s.is_empty())
        .or_else(|| raw.get("origin").and_then(|o| str_field(o, "from")))
        .unwrap_or_default();
    let channel = str_field(raw, "lastChannel")
        .filter(|s| !s.is_empty())
        .or_else(|| str_field(raw, "channel"))
        .unwrap_or_default();

    Session {
        session_key: key.to_string(),
        session_id: str_field(raw, "sessionId").unwrap_or_default(),
        agent_id: agent_id.to_string(),
        updated_at: int_field(raw, "updatedAt"),
        channel,
        model: str_field(raw, "model").unwrap_or_default(),
        input_tokens: uint_field(raw, "inputTokens"),
        output_tokens: uint_field(raw, "outputTokens"),
        context_tokens: uint_field(raw, "contextTokens"),
        total_tokens: uint_field(raw, "totalTokens"),
        display_name,
        chat_type: str_field(raw, "chatType").unwrap_or_default(),
        subject: str_field(raw, "subject").unwrap_or_default(),
    }
}

pub(crate) fn sort_newest_first(sessions: &mut [Session]) {
    sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

/// Roll up one agent's sessions as of `now_ms`.
pub fn stats_for(sessions: &[Session], now_ms: i64) -> AgentStats {
    let cutoff = now_ms.saturating_sub(MONTH_WINDOW_MS);
    let mut stats = AgentStats {
        session_count: sessions.len(),
        ..AgentStats::default()
    };

    for session in sessions {
        stats.total_tokens = stats.total_tokens.saturating_add(session.total_tokens);
        stats.total_input = stats.total_input.saturating_add(session.input_tokens);
        stats.total_output = stats.total_output.saturating_add(session.output_tokens);
        if session.updated_at > cutoff {
            stats.monthly_tokens = stats.monthly_tokens.saturating_add(session.total_tokens);
        }
        stats.last_active = stats.last_active.max(session.updated_at);
    }

    stats
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn int_field(value: &Value, key: &str) -> i64 {
    value
        .get(key)
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
        .unwrap_or(0)
}

fn uint_field(value: &Value, key: &str) -> u64 {
    value
        .get(key)
        .and_then(|v| v.as_u64().or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)))
        .unwrap_or(0)
}
