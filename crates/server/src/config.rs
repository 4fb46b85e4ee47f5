// crates/server/src/config.rs
//! Command-line and environment configuration for the dashboard server.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use openclaw_dash_core::StateLayout;

/// Default port for the server.
pub const DEFAULT_PORT: u16 = 3847;

/// Default interval between SSE keepalive comments.
pub const DEFAULT_KEEPALIVE_SECS: u64 = 30;

/// Frontend bundle picked up when `--static-dir` is not given.
const DEFAULT_STATIC_DIR: &str = "dist/frontend";

#[derive(Debug, Clone, Parser)]
#[command(name = "openclaw-dash", version, about = "Read-only dashboard API over an OpenClaw state directory")]
pub struct ServerConfig {
    /// OpenClaw state directory (defaults to ~/.openclaw).
    #[arg(long, env = "OPENCLAW_DIR")]
    pub root: Option<PathBuf>,

    #[arg(long, env = "OPENCLAW_DASH_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    #[arg(long, env = "OPENCLAW_DASH_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Shared secret required on every /api request. Empty disables auth.
    #[arg(long, env = "OPENCLAW_DASH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Directory holding the built frontend.
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Agent whose session directory is watched for changes. Repeatable;
    /// when absent, every agent in the roster is watched.
    #[arg(
        long = "watch-agent",
        env = "OPENCLAW_DASH_WATCH_AGENTS",
        value_delimiter = ','
    )]
    pub watch_agents: Vec<String>,

    /// Seconds between keepalive comments on the event stream.
    #[arg(long, default_value_t = DEFAULT_KEEPALIVE_SECS)]
    pub keepalive_secs: u64,
}

impl ServerConfig {
    /// The state root, or `None` if neither `--root` nor a home directory
    /// is available.
    pub fn state_root(&self) -> Option<PathBuf> {
        self.root.clone().or_else(StateLayout::default_root)
    }

    pub fn auth_token(&self) -> Option<String> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    }

    /// Resolve the static directory.
    ///
    /// Priority:
    /// 1. `--static-dir` / `STATIC_DIR` (explicit override)
    /// 2. `./dist/frontend` (if it exists)
    /// 3. None (API-only mode)
    pub fn static_dir(&self) -> Option<PathBuf> {
        self.static_dir.clone().or_else(|| {
            let dist = PathBuf::from(DEFAULT_STATIC_DIR);
            dist.is_dir().then_some(dist)
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn keepalive(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs.max(1))
    }

    pub fn watch_agents(&self) -> Vec<String> {
        self.watch_agents
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }
}
