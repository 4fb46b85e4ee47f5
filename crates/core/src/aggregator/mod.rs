// crates/core/src/aggregator/mod.rs
//! Derived views over the OpenClaw state directory.
//!
//! [`Aggregator`] owns the layout, the TTL cache and the clock. Every view
//! is recomputed from disk (through the cache where noted) and degrades to
//! empty/default values when a source file is missing or malformed.

mod cron;
mod sessions;
mod tokens;
mod transcript;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::cache::{Clock, SystemClock, TtlCache};
use crate::error::AggregateError;
use crate::log_line::{parse_log, MAX_LOG_EVENTS};
use crate::paths::StateLayout;
use crate::reader::{read_structured, read_tail_records, read_text};
use crate::types::{
    Agent, AgentDetail, AgentStats, AgentWithStats, CronJob, CronRun, LogEvent, Overview, Session,
    StateSummary, TokenUsage, Totals, TranscriptMessage,
};

pub use cron::MAX_RUNS_PER_JOB;
pub use sessions::{stats_for, MONTH_WINDOW_MS};
pub use tokens::{rollup, DAILY_WINDOW_DAYS};
pub use transcript::{DEFAULT_TRANSCRIPT_LIMIT, TRANSCRIPT_SCAN_RECORDS};

pub const AGENTS_TTL: Duration = Duration::from_secs(30);
pub const SESSIONS_TTL: Duration = Duration::from_secs(10);
pub const DEFAULT_COMMANDS_LIMIT: usize = 100;

const AGENTS_KEY: &str = "agents";

/// Read-only aggregation over one state root.
pub struct Aggregator {
    layout: StateLayout,
    cache: TtlCache,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("layout", &self.layout)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Aggregator {
    pub fn new(layout: StateLayout) -> Self {
        Self::with_clock(layout, Arc::new(SystemClock))
    }

    /// Build with an explicit clock; the cache shares it.
    pub fn with_clock(layout: StateLayout, clock: Arc<dyn Clock>) -> Self {
        Self {
            layout,
            cache: TtlCache::new(clock.clone()),
            clock,
        }
    }

    pub fn layout(&self) -> &StateLayout {
        &self.layout
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// The agent roster from `openclaw.json`, cached for 30s.
    pub fn agents(&self) -> Arc<Vec<Agent>> {
        self.cache.get_or_compute(AGENTS_KEY, AGENTS_TTL, || {
            read_structured::<Value>(&self.layout.config_file())
                .map(|config| sessions::agents_from_config(&config))
                .unwrap_or_default()
        })
    }

    pub fn find_agent(&self, agent_id: &str) -> Result<Agent, AggregateError> {
        self.agents()
            .iter()
            .find(|agent| agent.id == agent_id)
            .cloned()
            .ok_or_else(|| AggregateError::AgentNotFound(agent_id.to_string()))
    }

    /// One agent's sessions, newest first, cached for 10s per agent.
    pub fn agent_sessions(&self, agent_id: &str) -> Arc<Vec<Session>> {
        let key = format!("sessions:{agent_id}");
        self.cache.get_or_compute(&key, SESSIONS_TTL, || {
            self.layout
                .agent_session_map(agent_id)
                .and_then(|path| read_structured::<Value>(&path))
                .map(|map| sessions::sessions_from_map(agent_id, &map))
                .unwrap_or_default()
        })
    }

    /// Every agent's sessions, newest first across agents.
    pub fn all_sessions(&self) -> Vec<Session> {
        let mut all: Vec<Session> = self
            .agents()
            .iter()
            .flat_map(|agent| self.agent_sessions(&agent.id).as_ref().clone())
            .collect();
        sessions::sort_newest_first(&mut all);
        all
    }

    pub fn agent_stats(&self, agent_id: &str) -> AgentStats {
        stats_for(&self.agent_sessions(agent_id), self.now_ms())
    }

    pub fn agents_with_stats(&self) -> Vec<AgentWithStats> {
        self.agents()
            .iter()
            .map(|agent| AgentWithStats {
                agent: agent.clone(),
                stats: self.agent_stats(&agent.id),
            })
            .collect()
    }

    pub fn agent_detail(&self, agent_id: &str) -> Result<AgentDetail, AggregateError> {
        let agent = self.find_agent(agent_id)?;
        let sessions = self.agent_sessions(agent_id);
        Ok(AgentDetail {
            agent,
            stats: stats_for(&sessions, self.now_ms()),
            sessions: sessions.as_ref().clone(),
        })
    }

    pub fn overview(&self) -> Overview {
        let agents = self.agents_with_stats();
        let totals = agents.iter().fold(Totals::default(), |acc, row| Totals {
            tokens: acc.tokens.saturating_add(row.stats.total_tokens),
            monthly_tokens: acc.monthly_tokens.saturating_add(row.stats.monthly_tokens),
            sessions: acc.sessions + row.stats.session_count,
        });
        let registry = read_structured::<Value>(&self.layout.cron_jobs_file());

        Overview {
            agents,
            health: self.state_summary(&self.layout.health_state_file()),
            usage: self.state_summary(&self.layout.usage_state_file()),
            totals,
            cron_summary: cron::summarize(cron::job_entries(registry.as_ref())),
        }
    }

    fn state_summary(&self, path: &std::path::Path) -> StateSummary {
        let text = read_text(path);
        let state = text.trim();
        StateSummary {
            state: if state.is_empty() { "ok" } else { state }.to_string(),
        }
    }

    pub fn health_events(&self) -> Vec<LogEvent> {
        parse_log(&read_text(&self.layout.health_log_file()), MAX_LOG_EVENTS)
    }

    pub fn usage_events(&self) -> Vec<LogEvent> {
        parse_log(&read_text(&self.layout.usage_log_file()), MAX_LOG_EVENTS)
    }

    /// Jobs from the registry, each with its last 20 runs oldest first.
    pub fn cron_jobs(&self) -> Vec<CronJob> {
        let registry = read_structured::<Value>(&self.layout.cron_jobs_file());
        cron::job_entries(registry.as_ref())
            .iter()
            .filter_map(cron::decode_job)
            .map(|mut job| {
                job.runs = self
                    .layout
                    .cron_runs_file(&job.id)
                    .map(|path| read_tail_records::<CronRun>(&path, MAX_RUNS_PER_JOB))
                    .unwrap_or_default();
                job
            })
            .collect()
    }

    /// The last `limit` command log records, oldest first.
    pub fn commands(&self, limit: usize) -> Vec<Value> {
        read_tail_records(&self.layout.commands_log_file(), limit)
    }

    pub fn token_usage(&self) -> TokenUsage {
        let agents = self.agents();
        let per_agent: Vec<(&Agent, Arc<Vec<Session>>)> = agents
            .iter()
            .map(|agent| (agent, self.agent_sessions(&agent.id)))
            .collect();
        rollup(
            per_agent
                .iter()
                .map(|(agent, sessions)| (*agent, sessions.as_slice())),
            self.now_ms(),
        )
    }

    /// The last `limit` messages of one session's transcript, or nothing if
    /// no transcript file in the agent's directory declares that session.
    pub fn session_transcript(
        &self,
        agent_id: &str,
        session_id: &str,
        limit: usize,
    ) -> Vec<TranscriptMessage> {
        let Some(dir) = self.layout.agent_sessions_dir(agent_id) else {
            debug!(agent_id, "Rejected agent id for transcript lookup");
            return Vec::new();
        };
        transcript::find_transcript(&dir, session_id, limit)
    }
}
