// crates/client/src/lib.rs
//! Student-side focus monitor for focus-guard.
//!
//! Runs the session timer, turns sustained focus loss into violation
//! reports, keeps the student's status in sync by polling and by the
//! realtime channel, and exposes it all as a watchable snapshot.

pub mod api;
pub mod config;
pub mod error;
pub mod monitor;
pub mod realtime;
pub mod session;
pub mod sync;

pub use api::{HttpStatusApi, StatusApi};
pub use config::ClientConfig;
pub use error::ClientError;
pub use monitor::{ActivityEntry, Alert, FocusMonitor, MonitorHandle, MonitorSnapshot};
pub use session::{FocusLossReason, FocusSession, SessionPhase, Violation, FOCUS_LOSS_GRACE};
pub use sync::{StatusSync, POLL_INTERVAL};

use std::sync::Arc;

use tokio::task::JoinHandle;

/// A running client: the focus monitor plus its realtime subscriber.
pub struct FocusClient {
    monitor: MonitorHandle,
    monitor_task: JoinHandle<()>,
    realtime_task: Option<JoinHandle<()>>,
}

impl FocusClient {
    /// Connect to the HTTP API described by `config`.
    pub fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let api = HttpStatusApi::new(&config.api_base_url, config.request_timeout)?;
        Ok(Self::with_api(Arc::new(api), config))
    }

    /// Run against any [`StatusApi`] implementation.
    pub fn with_api(api: Arc<dyn StatusApi>, config: &ClientConfig) -> Self {
        let (monitor, monitor_task) = FocusMonitor::spawn(api, config);
        let realtime_task = config.ws_url.clone().map(|ws_url| {
            realtime::spawn_realtime(
                ws_url,
                config.student_id.clone(),
                monitor.clone(),
                config.max_reconnect_delay,
            )
        });
        Self {
            monitor,
            monitor_task,
            realtime_task,
        }
    }

    pub fn monitor(&self) -> &MonitorHandle {
        &self.monitor
    }

    pub async fn shutdown(self) {
        self.monitor.shutdown();
        if let Some(task) = self.realtime_task {
            task.abort();
        }
        let _ = self.monitor_task.await;
    }
}
