//! Semantic change events and the targets that produce them.

use std::path::PathBuf;

use openclaw_dash_core::paths::WATCHED_FILES;
use openclaw_dash_core::StateLayout;
use serde::Serialize;

/// One pushed event, serialized as the JSON payload of an SSE frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ChangeEvent {
    /// First event on every stream.
    Connected,
    /// A watched state file changed; `file` is its path relative to the root.
    FileChange { file: String },
    /// Something in an agent's session directory changed.
    SessionChange {
        #[serde(rename = "agentId")]
        agent_id: String,
    },
}

impl ChangeEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Something the notifier watches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchTarget {
    File(String),
    SessionDir(String),
}

impl WatchTarget {
    /// Absolute path of the target, or `None` for an agent id that is not a
    /// plain directory name.
    pub fn path(&self, layout: &StateLayout) -> Option<PathBuf> {
        match self {
            WatchTarget::File(relative) => Some(layout.resolve(relative)),
            WatchTarget::SessionDir(agent_id) => layout.agent_sessions_dir(agent_id),
        }
    }

    /// The event emitted whenever this target changes.
    pub fn event(&self) -> ChangeEvent {
        match self {
            WatchTarget::File(relative) => ChangeEvent::FileChange {
                file: relative.clone(),
            },
            WatchTarget::SessionDir(agent_id) => ChangeEvent::SessionChange {
                agent_id: agent_id.clone(),
            },
        }
    }
}

/// The fixed state files followed by one session directory per agent.
pub fn watch_targets(agent_ids: &[String]) -> Vec<WatchTarget> {
    WATCHED_FILES
        .iter()
        .map(|file| WatchTarget::File(file.to_string()))
        .chain(agent_ids.iter().cloned().map(WatchTarget::SessionDir))
        .collect()
}
