// crates/client/src/config.rs
//! Student client configuration.

use std::time::Duration;

use crate::session::FOCUS_LOSS_GRACE;
use crate::sync::POLL_INTERVAL;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_WS_URL: &str = "ws://localhost:5000/ws";
pub const DEFAULT_STUDENT_ID: &str = "student 123";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base of the HTTP API, including the `/api` prefix.
    pub api_base_url: String,
    /// Realtime endpoint. `None` disables the realtime channel and leaves
    /// the monitor on polling alone.
    pub ws_url: Option<String>,
    pub student_id: String,
    pub poll_interval: Duration,
    pub grace_period: Duration,
    pub request_timeout: Duration,
    pub max_reconnect_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            ws_url: Some(DEFAULT_WS_URL.to_string()),
            student_id: DEFAULT_STUDENT_ID.to_string(),
            poll_interval: POLL_INTERVAL,
            grace_period: FOCUS_LOSS_GRACE,
            request_timeout: Duration::from_secs(10),
            max_reconnect_delay: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `FOCUS_GUARD_API_URL`, `FOCUS_GUARD_WS_URL`
    /// and `FOCUS_GUARD_STUDENT_ID`. An empty `FOCUS_GUARD_WS_URL` disables
    /// realtime.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("FOCUS_GUARD_API_URL") {
            config.api_base_url = url;
        }
        if let Ok(url) = std::env::var("FOCUS_GUARD_WS_URL") {
            config.ws_url = Some(url).filter(|u| !u.trim().is_empty());
        }
        if let Ok(id) = std::env::var("FOCUS_GUARD_STUDENT_ID") {
            config.student_id = id;
        }
        config
    }

    pub fn with_student(mut self, student_id: impl Into<String>) -> Self {
        self.student_id = student_id.into();
        self
    }
}
