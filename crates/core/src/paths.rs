//! Layout of the OpenClaw state directory.
//!
//! Single source of truth for where each state file lives, so the
//! aggregator and the change notifier agree on paths.

use std::path::{Path, PathBuf};

/// Files the change notifier watches, relative to the state root.
/// These strings are emitted verbatim in `file-change` events.
pub const WATCHED_FILES: [&str; 6] = [
    "healthcheck.state",
    "healthcheck.log",
    "usage-monitor.state",
    "usage-monitor.log",
    "cron/jobs.json",
    "logs/commands.log",
];

/// Resolves state file locations under an OpenClaw root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateLayout {
    root: PathBuf,
}

impl StateLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `~/.openclaw`, if a home directory can be determined.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".openclaw"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join a `/`-separated relative path onto the root.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("openclaw.json")
    }

    /// `agents/{id}/sessions`, or `None` when `agent_id` is not a plain
    /// directory name.
    pub fn agent_sessions_dir(&self, agent_id: &str) -> Option<PathBuf> {
        is_plain_component(agent_id)
            .then(|| self.root.join("agents").join(agent_id).join("sessions"))
    }

    pub fn agent_session_map(&self, agent_id: &str) -> Option<PathBuf> {
        self.agent_sessions_dir(agent_id)
            .map(|dir| dir.join("sessions.json"))
    }

    pub fn cron_jobs_file(&self) -> PathBuf {
        self.root.join("cron").join("jobs.json")
    }

    pub fn cron_runs_file(&self, job_id: &str) -> Option<PathBuf> {
        is_plain_component(job_id).then(|| {
            self.root
                .join("cron")
                .join("runs")
                .join(format!("{job_id}.jsonl"))
        })
    }

    pub fn health_state_file(&self) -> PathBuf {
        self.root.join("healthcheck.state")
    }

    pub fn health_log_file(&self) -> PathBuf {
        self.root.join("healthcheck.log")
    }

    pub fn usage_state_file(&self) -> PathBuf {
        self.root.join("usage-monitor.state")
    }

    pub fn usage_log_file(&self) -> PathBuf {
        self.root.join("usage-monitor.log")
    }

    pub fn commands_log_file(&self) -> PathBuf {
        self.root.join("logs").join("commands.log")
    }
}

/// Identifiers from config or URLs end up as path components; reject
/// anything that could step outside its parent directory.
fn is_plain_component(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0')
}
