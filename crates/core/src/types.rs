// crates/core/src/types.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_THEME: &str = "gray";
pub const DEFAULT_EMOJI: &str = "\u{1f916}";

/// How an agent presents itself in the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub theme: String,
    pub emoji: String,
}

impl Identity {
    /// The identity used when the config entry carries none.
    pub fn fallback(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            theme: DEFAULT_THEME.to_string(),
            emoji: DEFAULT_EMOJI.to_string(),
        }
    }
}

/// A configured assistant persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub identity: Identity,
}

/// Derived per-agent rollup; never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStats {
    pub session_count: usize,
    pub total_tokens: u64,
    pub monthly_tokens: u64,
    pub total_input: u64,
    pub total_output: u64,
    /// Epoch millis of the most recent session update, 0 if none.
    pub last_active: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentWithStats {
    #[serde(flatten)]
    pub agent: Agent,
    pub stats: AgentStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentDetail {
    #[serde(flatten)]
    pub agent: Agent,
    pub stats: AgentStats,
    pub sessions: Vec<Session>,
}

/// One conversation thread, as recorded in an agent's `sessions.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// The key this session is stored under in the session map.
    pub session_key: String,
    pub session_id: String,
    pub agent_id: String,
    /// Epoch millis.
    pub updated_at: i64,
    pub channel: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub context_tokens: u64,
    /// Read as stored; context tokens are not part of it.
    pub total_tokens: u64,
    pub display_name: String,
    pub chat_type: String,
    pub subject: String,
}

/// A parsed health or usage log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub timestamp: String,
    pub level: String,
    pub message: String,
}

// Cron documents are written by another process and drift between
// versions, so every member decodes leniently: a value of the wrong JSON
// type falls back to the member's default instead of rejecting the job.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CronSchedule {
    /// `"cron"`, `"every"`, or another kind passed through as-is.
    #[serde(deserialize_with = "lenient::string")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_string")]
    pub expr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_u64")]
    pub every_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_string")]
    pub tz: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CronDelivery {
    #[serde(deserialize_with = "lenient::string")]
    pub mode: String,
    #[serde(deserialize_with = "lenient::string")]
    pub channel: String,
    /// Chat ids arrive as numbers for some channels; kept as their decimal text.
    #[serde(deserialize_with = "lenient::string")]
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CronState {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_i64")]
    pub next_run_at_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_i64")]
    pub last_run_at_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_string")]
    pub last_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_u64")]
    pub last_duration_ms: Option<u64>,
}

/// One entry of a job's run-history file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CronRun {
    #[serde(deserialize_with = "lenient::i64_or_zero")]
    pub ts: i64,
    #[serde(deserialize_with = "lenient::string")]
    pub action: String,
    #[serde(deserialize_with = "lenient::string")]
    pub status: String,
    #[serde(deserialize_with = "lenient::string")]
    pub summary: String,
    #[serde(deserialize_with = "lenient::u64_or_zero")]
    pub duration_ms: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A scheduled job from `cron/jobs.json` plus its recent runs.
///
/// Members the dashboard does not interpret are kept in `extra` so the
/// job is passed through without loss.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CronJob {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub agent_id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::flag")]
    pub enabled: bool,
    #[serde(deserialize_with = "lenient::or_default")]
    pub schedule: CronSchedule,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_string")]
    pub session_target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_object")]
    pub delivery: Option<CronDelivery>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub state: CronState,
    /// Oldest first, at most the last 20 recorded.
    #[serde(deserialize_with = "lenient::or_default")]
    pub runs: Vec<CronRun>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `deserialize_with` helpers that never fail on a well-formed JSON value.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(opt_string(d)?.unwrap_or_default())
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(matches!(Value::deserialize(d)?, Value::Bool(true)))
    }

    pub fn opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f as i64),
            _ => None,
        })
    }

    pub fn i64_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        Ok(opt_i64(d)?.unwrap_or(0))
    }

    pub fn opt_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        let float = |f: f64| (f >= 0.0).then_some(f as u64);
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(float)),
            Value::String(s) => s.trim().parse::<f64>().ok().and_then(float),
            _ => None,
        })
    }

    pub fn u64_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        Ok(opt_u64(d)?.unwrap_or(0))
    }

    /// A nested object, or `T::default()` if the member is not one.
    pub fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        Ok(serde_json::from_value(Value::deserialize(d)?).unwrap_or_default())
    }

    pub fn opt_object<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(d)? {
            value @ Value::Object(_) => serde_json::from_value(value).ok(),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelUsage {
    pub model: String,
    pub total_tokens: u64,
    pub session_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentUsage {
    pub agent_id: String,
    pub agent_name: String,
    pub emoji: String,
    pub total_tokens: u64,
    pub monthly_tokens: u64,
    pub session_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyUsage {
    /// UTC calendar day, `YYYY-MM-DD`.
    pub date: String,
    pub tokens: u64,
}

/// Token accounting across every agent and session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub total_tokens: u64,
    pub monthly_tokens: u64,
    pub total_sessions: usize,
    pub by_model: Vec<ModelUsage>,
    pub by_agent: Vec<AgentUsage>,
    /// Exactly 30 entries, oldest day first.
    pub daily: Vec<DailyUsage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSummary {
    pub state: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub tokens: u64,
    pub monthly_tokens: u64,
    pub sessions: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CronSummary {
    pub total: usize,
    pub enabled: usize,
}

/// Landing-page rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub agents: Vec<AgentWithStats>,
    pub health: StateSummary,
    pub usage: StateSummary,
    pub totals: Totals,
    pub cron_summary: CronSummary,
}

/// A message projected out of a session transcript file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptMessage {
    pub id: Option<String>,
    pub timestamp: Option<Value>,
    pub role: Option<String>,
    pub content: String,
}
