// crates/server/src/state.rs
//! Application state for the Axum server.

use std::sync::Arc;
use std::time::Instant;

use focus_guard_db::Database;

use crate::notifier::{Notifier, WebhookNotifier};
use crate::realtime::Broadcaster;
use crate::service::StatusService;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// Status transitions, persistence and pushes.
    pub service: StatusService,
    /// The process-wide realtime broadcaster. The service holds a clone of
    /// the same handle.
    pub realtime: Broadcaster,
}

impl AppState {
    /// Create a new application state wrapped in an Arc for sharing.
    pub fn new(db: Database, notifier: Arc<dyn Notifier>) -> Arc<Self> {
        let realtime = Broadcaster::new();
        Arc::new(Self {
            start_time: Instant::now(),
            service: StatusService::new(db, realtime.clone(), notifier),
            realtime,
        })
    }

    /// State with mentor notifications disabled.
    pub fn without_notifier(db: Database) -> Arc<Self> {
        Self::new(db, Arc::new(WebhookNotifier::disabled()))
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
