// crates/server/src/config.rs
//! Command-line and environment configuration for the server binary.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Default port for the server.
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, Parser)]
#[command(name = "focus-guard", version, about = "Student focus-session status server")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind.
    #[arg(long, env = "FOCUS_GUARD_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// SQLite database file. Defaults to the user cache directory.
    #[arg(long, env = "FOCUS_GUARD_DB")]
    pub db_path: Option<PathBuf>,

    /// Mentor notification webhook. Unset disables notifications.
    #[arg(long, env = "N8N_WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// Timeout for a single webhook request.
    #[arg(long, env = "FOCUS_GUARD_WEBHOOK_TIMEOUT_SECS", default_value_t = 10)]
    pub webhook_timeout_secs: u64,

    /// Comma-separated allowed CORS origins; `*` allows any.
    #[arg(long, env = "CORS_ORIGIN", default_value = "*")]
    pub cors_origin: String,

    /// Skip upserting the demo students on startup.
    #[arg(long)]
    pub no_seed: bool,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.webhook_timeout_secs.max(1))
    }

    /// Parsed CORS origins; empty means any origin.
    pub fn cors_origins(&self) -> Vec<String> {
        parse_origins(&self.cors_origin)
    }
}

/// Split a comma list into origins. A `*` anywhere means "any" (empty list).
pub fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();
    if origins.iter().any(|o| o == "*") {
        return Vec::new();
    }
    origins
}
