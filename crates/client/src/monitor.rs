// crates/client/src/monitor.rs
//! The focus monitor actor.
//!
//! One task owns the [`FocusSession`], the cached server status and the
//! activity log. Commands arrive over a channel, network calls run on
//! spawned tasks that report back over a second channel, and every change
//! is published as a [`MonitorSnapshot`] on a `watch` channel.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use focus_guard_core::{
    Intervention, OutcomeResponse, StatusResponse, StatusUpdate, StudentStatus,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::api::StatusApi;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::{FocusLossReason, FocusSession, GraceDeadline, SessionPhase, Violation};
use crate::sync::{FetchTicket, StatusSync};

/// Activity entries kept, newest first.
pub const ACTIVITY_LOG_CAPACITY: usize = 25;

const DISPLAY_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub at: DateTime<Utc>,
    pub message: String,
}

/// Everything a UI needs to render the student's screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorSnapshot {
    pub status: StudentStatus,
    pub intervention: Option<Intervention>,
    pub loading: bool,
    pub phase: SessionPhase,
    pub running: bool,
    pub violated: bool,
    pub elapsed_secs: u64,
    /// `MM:SS`.
    pub focus_duration: String,
    pub last_checkin: Option<OutcomeResponse>,
    pub alert: Option<Alert>,
    pub activity: Vec<ActivityEntry>,
}

impl MonitorSnapshot {
    pub fn has_activity(&self, message: &str) -> bool {
        self.activity.iter().any(|entry| entry.message == message)
    }
}

#[derive(Debug, Clone)]
enum Command {
    Start,
    Stop,
    Reset,
    FocusLost(FocusLossReason),
    FocusRegained,
    Refresh,
    Resync,
    SubmitCheckin(i64),
    CompleteIntervention,
    ApplyPush(StatusUpdate),
    DismissAlert,
    Shutdown,
}

/// Results of spawned network calls, delivered back to the actor.
enum TaskResult {
    Fetched {
        ticket: FetchTicket,
        result: Result<StatusResponse, ClientError>,
    },
    Reported(Result<OutcomeResponse, ClientError>),
    CheckedIn(Result<OutcomeResponse, ClientError>),
    Completed(Result<(), ClientError>),
}

/// Cloneable control surface for a running [`FocusMonitor`].
#[derive(Clone)]
pub struct MonitorHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<MonitorSnapshot>,
}

impl MonitorHandle {
    fn send(&self, command: Command) -> Result<(), ClientError> {
        self.commands
            .send(command)
            .map_err(|_| ClientError::MonitorClosed)
    }

    pub fn start(&self) -> Result<(), ClientError> {
        self.send(Command::Start)
    }

    pub fn stop(&self) -> Result<(), ClientError> {
        self.send(Command::Stop)
    }

    pub fn reset(&self) -> Result<(), ClientError> {
        self.send(Command::Reset)
    }

    pub fn focus_lost(&self, reason: FocusLossReason) -> Result<(), ClientError> {
        self.send(Command::FocusLost(reason))
    }

    pub fn focus_regained(&self) -> Result<(), ClientError> {
        self.send(Command::FocusRegained)
    }

    /// Fetch status with the loading indicator shown.
    pub fn refresh(&self) -> Result<(), ClientError> {
        self.send(Command::Refresh)
    }

    /// Fetch status in the background, e.g. after the realtime channel
    /// (re)joins and pushes may have been missed.
    pub fn resync(&self) -> Result<(), ClientError> {
        self.send(Command::Resync)
    }

    pub fn submit_checkin(&self, quiz_score: i64) -> Result<(), ClientError> {
        self.send(Command::SubmitCheckin(quiz_score))
    }

    pub fn complete_intervention(&self) -> Result<(), ClientError> {
        self.send(Command::CompleteIntervention)
    }

    /// Apply a status pushed over the realtime channel.
    pub fn apply_push(&self, update: StatusUpdate) -> Result<(), ClientError> {
        self.send(Command::ApplyPush(update))
    }

    pub fn dismiss_alert(&self) -> Result<(), ClientError> {
        self.send(Command::DismissAlert)
    }

    pub fn shutdown(&self) {
        let _ = self.send(Command::Shutdown);
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MonitorSnapshot> {
        self.snapshots.clone()
    }
}

pub struct FocusMonitor {
    api: Arc<dyn StatusApi>,
    student_id: String,
    poll_interval: Duration,

    session: FocusSession,
    sync: StatusSync,
    status: StudentStatus,
    intervention: Option<Intervention>,
    last_checkin: Option<OutcomeResponse>,
    alert: Option<Alert>,
    activity: VecDeque<ActivityEntry>,
    /// Check-ins and completions in flight; each holds the loading indicator.
    pending_actions: usize,

    tick_at: Option<Instant>,
    poll_at: Option<Instant>,

    commands: mpsc::UnboundedReceiver<Command>,
    results_tx: mpsc::UnboundedSender<TaskResult>,
    results_rx: mpsc::UnboundedReceiver<TaskResult>,
    snapshots: watch::Sender<MonitorSnapshot>,
}

impl FocusMonitor {
    /// Spawn the monitor task. It fetches status immediately and runs until
    /// [`MonitorHandle::shutdown`] or until every handle is dropped.
    pub fn spawn(api: Arc<dyn StatusApi>, config: &ClientConfig) -> (MonitorHandle, JoinHandle<()>) {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let (snapshots, snapshots_rx) = watch::channel(MonitorSnapshot::default());

        let monitor = FocusMonitor {
            api,
            student_id: config.student_id.clone(),
            poll_interval: config.poll_interval,
            session: FocusSession::new(config.grace_period),
            sync: StatusSync::new(),
            status: StudentStatus::default(),
            intervention: None,
            last_checkin: None,
            alert: None,
            activity: VecDeque::with_capacity(ACTIVITY_LOG_CAPACITY),
            pending_actions: 0,
            tick_at: None,
            poll_at: None,
            commands,
            results_tx,
            results_rx,
            snapshots,
        };

        let handle = MonitorHandle {
            commands: commands_tx,
            snapshots: snapshots_rx,
        };
        (handle, tokio::spawn(monitor.run()))
    }

    async fn run(mut self) {
        info!(student_id = %self.student_id, "Focus monitor started");
        self.fetch(true);
        self.publish();

        loop {
            let grace = self.session.pending_deadline();
            tokio::select! {
                command = self.commands.recv() => match command {
                    None | Some(Command::Shutdown) => break,
                    Some(command) => self.handle_command(command),
                },
                Some(result) = self.results_rx.recv() => self.handle_result(result),
                _ = wait_until(grace.map(|g| g.at)) => {
                    if let Some(deadline) = grace {
                        self.on_grace_elapsed(deadline);
                    }
                }
                _ = wait_until(self.tick_at) => {
                    self.tick_at = self.session.is_running().then(|| Instant::now() + DISPLAY_TICK);
                }
                _ = wait_until(self.poll_at) => {
                    self.poll_at = None;
                    self.fetch(false);
                    self.update_polling();
                }
            }
            self.publish();
        }
        info!(student_id = %self.student_id, "Focus monitor stopped");
    }

    fn handle_command(&mut self, command: Command) {
        let now = Instant::now();
        match command {
            Command::Start => {
                if self.session.start(now) {
                    self.tick_at = Some(now + DISPLAY_TICK);
                    self.log_activity("Focus session started");
                }
            }
            Command::Stop => {
                if self.session.is_running() {
                    self.session.stop(now);
                    self.tick_at = None;
                    self.log_activity("Focus session paused");
                }
            }
            Command::Reset => {
                self.session.reset();
                self.tick_at = None;
                self.log_activity("Session reset");
            }
            Command::FocusLost(reason) => {
                if let Some(deadline) = self.session.focus_lost(now, reason) {
                    debug!(reason = %reason, generation = deadline.generation, "Focus lost; grace countdown armed");
                }
            }
            Command::FocusRegained => {
                if self.session.focus_regained() {
                    debug!("Focus regained within grace period");
                }
            }
            Command::Refresh => self.fetch(true),
            Command::Resync => self.fetch(false),
            Command::SubmitCheckin(score) => self.submit_checkin(score, now),
            Command::CompleteIntervention => self.complete_intervention(),
            Command::ApplyPush(update) => self.apply_push(update),
            Command::DismissAlert => self.alert = None,
            Command::Shutdown => {}
        }
    }

    fn on_grace_elapsed(&mut self, deadline: GraceDeadline) {
        let now = Instant::now();
        let Some(violation) = self.session.grace_elapsed(now, deadline.generation) else {
            return;
        };
        self.tick_at = None;
        // Fetches issued before the violation must not roll it back.
        self.sync.supersede();
        self.status = StudentStatus::NeedsIntervention;
        self.intervention = None;
        self.update_polling();
        self.log_activity("Focus interrupted");
        warn!(
            student_id = %self.student_id,
            focus_duration = %violation.focus_duration,
            reason = %violation.reason,
            "Focus violation detected"
        );
        self.report(violation);
    }

    fn report(&self, violation: Violation) {
        let api = Arc::clone(&self.api);
        let student_id = self.student_id.clone();
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            let result = api
                .report_violation(&student_id, &violation.focus_duration, violation.reason.as_str())
                .await;
            let _ = results.send(TaskResult::Reported(result));
        });
    }

    fn fetch(&mut self, spinner: bool) {
        let ticket = self.sync.begin(spinner);
        let api = Arc::clone(&self.api);
        let student_id = self.student_id.clone();
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_status(&student_id).await;
            let _ = results.send(TaskResult::Fetched { ticket, result });
        });
    }

    fn submit_checkin(&mut self, score: i64, now: Instant) {
        if !(1..=10).contains(&score) {
            self.raise_alert("Invalid score", "Score must be 1–10");
            return;
        }
        let focus_minutes = self.session.focus_minutes(now);
        let api = Arc::clone(&self.api);
        let student_id = self.student_id.clone();
        let results = self.results_tx.clone();
        self.pending_actions += 1;
        tokio::spawn(async move {
            let result = api.submit_checkin(&student_id, score, focus_minutes).await;
            let _ = results.send(TaskResult::CheckedIn(result));
        });
    }

    fn complete_intervention(&mut self) {
        let Some(intervention_id) = self.intervention.as_ref().map(|i| i.id) else {
            self.raise_alert("No intervention", "There is no pending task to complete");
            return;
        };
        let api = Arc::clone(&self.api);
        let student_id = self.student_id.clone();
        let results = self.results_tx.clone();
        self.pending_actions += 1;
        tokio::spawn(async move {
            let result = api.complete_intervention(&student_id, intervention_id).await;
            let _ = results.send(TaskResult::Completed(result));
        });
    }

    fn apply_push(&mut self, update: StatusUpdate) {
        self.sync.supersede();
        match update.intervention {
            Some(intervention) => self.intervention = Some(intervention),
            None if update.status != StudentStatus::Remedial => self.intervention = None,
            None => {}
        }
        if self.status != update.status {
            self.log_activity(format!("Status changed to {}", update.status));
        }
        self.status = update.status;
        self.update_polling();
    }

    fn handle_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Fetched { ticket, result } => {
                let resolution = self.sync.finish(ticket);
                if !resolution.apply {
                    debug!(student_id = %self.student_id, "Discarding superseded status fetch");
                    return;
                }
                match result {
                    Ok(response) => {
                        self.status = response.student.status;
                        self.intervention = response.intervention;
                        self.update_polling();
                        self.log_activity("Synced status with server");
                    }
                    Err(e) => {
                        warn!(student_id = %self.student_id, error = %e, "Status fetch failed");
                        self.log_activity("Failed to fetch status");
                        if ticket.shows_spinner() {
                            self.raise_alert("Status unavailable", e.to_string());
                        }
                    }
                }
            }
            TaskResult::Reported(Ok(outcome)) => {
                info!(student_id = %self.student_id, outcome = %outcome.status, "Focus violation reported");
                self.log_activity("Focus violation reported");
                self.fetch(false);
            }
            TaskResult::Reported(Err(e)) => {
                warn!(student_id = %self.student_id, error = %e, "Failed to notify mentor");
                self.log_activity("Failed to notify mentor");
            }
            TaskResult::CheckedIn(result) => {
                self.pending_actions = self.pending_actions.saturating_sub(1);
                match result {
                    Ok(outcome) => {
                        self.log_activity(format!("Check-in submitted: {}", outcome.status));
                        self.last_checkin = Some(outcome);
                        self.fetch(false);
                    }
                    Err(e) => {
                        self.log_activity("Check-in failed");
                        self.raise_alert("Check-in failed", e.to_string());
                    }
                }
            }
            TaskResult::Completed(result) => {
                self.pending_actions = self.pending_actions.saturating_sub(1);
                match result {
                    Ok(()) => {
                        self.sync.supersede();
                        self.status = StudentStatus::Normal;
                        self.intervention = None;
                        self.session.clear_violation();
                        self.update_polling();
                        self.log_activity("Intervention completed");
                        self.fetch(false);
                    }
                    Err(e) => {
                        self.log_activity("Failed to complete intervention");
                        self.raise_alert("Could not complete task", e.to_string());
                    }
                }
            }
        }
    }

    /// Poll only while a mentor decision is outstanding.
    fn update_polling(&mut self) {
        if !self.status.requires_polling() {
            self.poll_at = None;
        } else if self.poll_at.is_none() {
            self.poll_at = Some(Instant::now() + self.poll_interval);
        }
    }

    fn raise_alert(&mut self, title: &str, message: impl Into<String>) {
        self.alert = Some(Alert {
            title: title.to_string(),
            message: message.into(),
        });
    }

    fn log_activity(&mut self, message: impl Into<String>) {
        self.activity.push_front(ActivityEntry {
            at: Utc::now(),
            message: message.into(),
        });
        self.activity.truncate(ACTIVITY_LOG_CAPACITY);
    }

    fn publish(&self) {
        let now = Instant::now();
        let elapsed_secs = self.session.elapsed_secs(now);
        self.snapshots.send_replace(MonitorSnapshot {
            status: self.status,
            intervention: self.intervention.clone(),
            loading: self.sync.loading() || self.pending_actions > 0,
            phase: self.session.phase(),
            running: self.session.is_running(),
            violated: self.session.violated(),
            elapsed_secs,
            focus_duration: self.session.focus_duration(now),
            last_checkin: self.last_checkin.clone(),
            alert: self.alert.clone(),
            activity: self.activity.iter().cloned().collect(),
        });
    }
}

/// Sleep until `deadline`, or forever when there is none.
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use focus_guard_core::{evaluate_checkin, InterventionStatus, Student};
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    fn student(status: StudentStatus) -> Student {
        Student {
            id: "student 123".into(),
            name: "Demo Student".into(),
            email: "student@example.com".into(),
            status,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn intervention(id: i64) -> Intervention {
        Intervention {
            id,
            student_id: "student 123".into(),
            task_description: "Review the missed section".into(),
            status: InterventionStatus::Pending,
            assigned_at: 0,
            completed_at: None,
        }
    }

    fn response(status: StudentStatus, intervention: Option<Intervention>) -> StatusResponse {
        StatusResponse {
            student: student(status),
            intervention,
        }
    }

    /// In-memory server: status changes follow the same rules as the real one.
    struct FakeApi {
        server: Mutex<StatusResponse>,
        gated_fetches: Mutex<VecDeque<oneshot::Receiver<StatusResponse>>>,
        fetches: Mutex<usize>,
        reports: Mutex<Vec<(String, String)>>,
        checkins: Mutex<Vec<(i64, i64)>>,
        fail_reports: bool,
    }

    impl FakeApi {
        fn new(initial: StatusResponse) -> Arc<Self> {
            Self::build(initial, false)
        }

        fn build(initial: StatusResponse, fail_reports: bool) -> Arc<Self> {
            Arc::new(Self {
                server: Mutex::new(initial),
                gated_fetches: Mutex::new(VecDeque::new()),
                fetches: Mutex::new(0),
                reports: Mutex::new(Vec::new()),
                checkins: Mutex::new(Vec::new()),
                fail_reports,
            })
        }

        /// The next fetch waits for the returned sender instead of reading
        /// the server state.
        fn gate_next_fetch(&self) -> oneshot::Sender<StatusResponse> {
            let (tx, rx) = oneshot::channel();
            self.gated_fetches.lock().unwrap().push_back(rx);
            tx
        }

        fn fetch_count(&self) -> usize {
            *self.fetches.lock().unwrap()
        }

        fn reports(&self) -> Vec<(String, String)> {
            self.reports.lock().unwrap().clone()
        }

        fn set_server(&self, value: StatusResponse) {
            *self.server.lock().unwrap() = value;
        }
    }

    #[async_trait]
    impl StatusApi for FakeApi {
        async fn fetch_status(&self, _student_id: &str) -> Result<StatusResponse, ClientError> {
            *self.fetches.lock().unwrap() += 1;
            let gate = self.gated_fetches.lock().unwrap().pop_front();
            match gate {
                Some(rx) => rx.await.map_err(|_| ClientError::MonitorClosed),
                None => Ok(self.server.lock().unwrap().clone()),
            }
        }

        async fn submit_checkin(
            &self,
            _student_id: &str,
            quiz_score: i64,
            focus_minutes: i64,
        ) -> Result<OutcomeResponse, ClientError> {
            self.checkins.lock().unwrap().push((quiz_score, focus_minutes));
            let verdict = evaluate_checkin(quiz_score, focus_minutes);
            self.server.lock().unwrap().student.status = verdict.student_status();
            Ok(OutcomeResponse {
                status: verdict.response_label().to_string(),
                warning: None,
            })
        }

        async fn report_violation(
            &self,
            _student_id: &str,
            focus_duration: &str,
            reason: &str,
        ) -> Result<OutcomeResponse, ClientError> {
            self.reports
                .lock()
                .unwrap()
                .push((focus_duration.to_string(), reason.to_string()));
            if self.fail_reports {
                return Err(ClientError::Api {
                    status: 500,
                    message: "Database error".into(),
                });
            }
            self.server.lock().unwrap().student.status = StudentStatus::NeedsIntervention;
            Ok(OutcomeResponse {
                status: "Logged cheat and notified mentor".into(),
                warning: None,
            })
        }

        async fn complete_intervention(
            &self,
            _student_id: &str,
            intervention_id: i64,
        ) -> Result<(), ClientError> {
            let mut server = self.server.lock().unwrap();
            match &server.intervention {
                Some(pending) if pending.id == intervention_id => {
                    server.intervention = None;
                    server.student.status = StudentStatus::Normal;
                    Ok(())
                }
                _ => Err(ClientError::Api {
                    status: 404,
                    message: "Intervention not found".into(),
                }),
            }
        }
    }

    fn spawn_monitor(api: &Arc<FakeApi>) -> MonitorHandle {
        let api: Arc<dyn StatusApi> = api.clone();
        let (handle, _task) = FocusMonitor::spawn(api, &ClientConfig::default());
        handle
    }

    /// Let the monitor drain its queues without moving past any timer.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_fetch_populates_status() {
        let api = FakeApi::new(response(StudentStatus::Remedial, Some(intervention(7))));
        let handle = spawn_monitor(&api);
        settle().await;

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.status, StudentStatus::Remedial);
        assert_eq!(snapshot.intervention.map(|i| i.id), Some(7));
        assert!(!snapshot.loading);
        assert_eq!(api.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_regained_within_grace_is_ignored() {
        let api = FakeApi::new(response(StudentStatus::Normal, None));
        let handle = spawn_monitor(&api);
        handle.start().unwrap();
        handle.focus_lost(FocusLossReason::WindowBlurred).unwrap();
        tokio::time::sleep(Duration::from_millis(2900)).await;
        handle.focus_regained().unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;

        let snapshot = handle.snapshot();
        assert!(api.reports().is_empty());
        assert!(!snapshot.violated);
        assert_eq!(snapshot.phase, SessionPhase::Running);
        assert_eq!(snapshot.status, StudentStatus::Normal);
        assert!(snapshot.elapsed_secs >= 12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sustained_focus_loss_reports_once() {
        let api = FakeApi::new(response(StudentStatus::Normal, Some(intervention(2))));
        let handle = spawn_monitor(&api);
        handle.start().unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;

        handle.focus_lost(FocusLossReason::WindowBlurred).unwrap();
        tokio::time::sleep(Duration::from_millis(1000)).await;
        handle.focus_lost(FocusLossReason::WindowHidden).unwrap();
        tokio::time::sleep(Duration::from_millis(1000)).await;
        handle.focus_lost(FocusLossReason::AppBackgrounded).unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;

        let snapshot = handle.snapshot();
        let reports = api.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].1, "app backgrounded");
        assert!(snapshot.violated);
        assert!(!snapshot.running);
        assert_eq!(snapshot.phase, SessionPhase::Violated);
        assert_eq!(snapshot.status, StudentStatus::NeedsIntervention);
        assert!(snapshot.has_activity("Focus interrupted"));
        assert!(snapshot.has_activity("Focus violation reported"));

        // The counter stopped at the violation: 60 s + 2 s of repeats + 3 s grace.
        assert_eq!(reports[0].0, "01:05");
        assert_eq!(snapshot.elapsed_secs, 65);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(handle.snapshot().elapsed_secs, 65);
        assert_eq!(api.reports().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_during_grace_cancels_violation() {
        let api = FakeApi::new(response(StudentStatus::Normal, None));
        let handle = spawn_monitor(&api);
        handle.start().unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        handle.focus_lost(FocusLossReason::WindowHidden).unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        handle.reset().unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;

        let snapshot = handle.snapshot();
        assert!(api.reports().is_empty());
        assert!(!snapshot.violated);
        assert_eq!(snapshot.phase, SessionPhase::Idle);
        assert_eq!(snapshot.elapsed_secs, 0);
        assert_eq!(snapshot.status, StudentStatus::Normal);
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_loss_while_idle_is_ignored() {
        let api = FakeApi::new(response(StudentStatus::Normal, None));
        let handle = spawn_monitor(&api);
        handle.focus_lost(FocusLossReason::AppBackgrounded).unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(api.reports().is_empty());
        assert_eq!(handle.snapshot().phase, SessionPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_report_keeps_local_status() {
        let api = FakeApi::build(response(StudentStatus::Normal, None), true);
        let handle = spawn_monitor(&api);
        handle.start().unwrap();
        handle.focus_lost(FocusLossReason::WindowBlurred).unwrap();
        tokio::time::sleep(Duration::from_secs(4)).await;

        let snapshot = handle.snapshot();
        assert_eq!(api.reports().len(), 1);
        assert!(snapshot.violated);
        assert_eq!(snapshot.status, StudentStatus::NeedsIntervention);
        assert!(snapshot.has_activity("Failed to notify mentor"));
        assert!(!snapshot.has_activity("Focus violation reported"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_issued_before_violation_is_discarded() {
        let api = FakeApi::build(response(StudentStatus::Normal, None), true);
        let handle = spawn_monitor(&api);
        settle().await;

        let gate = api.gate_next_fetch();
        handle.refresh().unwrap();
        handle.start().unwrap();
        handle.focus_lost(FocusLossReason::WindowBlurred).unwrap();
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(handle.snapshot().status, StudentStatus::NeedsIntervention);

        gate.send(response(StudentStatus::Normal, None)).unwrap();
        settle().await;
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.status, StudentStatus::NeedsIntervention);
        assert!(snapshot.violated);
        assert!(!snapshot.loading);

        // Still waiting on a mentor decision, so polling carries on.
        assert_eq!(api.fetch_count(), 2);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(api.fetch_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_grace_cancels_violation() {
        let api = FakeApi::new(response(StudentStatus::Normal, None));
        let handle = spawn_monitor(&api);
        handle.start().unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        handle.focus_lost(FocusLossReason::AppBackgrounded).unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        handle.stop().unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;

        let snapshot = handle.snapshot();
        assert!(api.reports().is_empty());
        assert!(!snapshot.violated);
        assert!(!snapshot.running);
        assert_eq!(snapshot.phase, SessionPhase::Idle);
        assert_eq!(snapshot.status, StudentStatus::Normal);
        // Paused, not reset: the time before the stop is kept.
        assert_eq!(snapshot.elapsed_secs, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_at_grace_deadline_does_not_extend_session() {
        let api = FakeApi::new(response(StudentStatus::Normal, None));
        let handle = spawn_monitor(&api);
        // Display ticks land on whole seconds, so one coincides with the
        // 3 s grace deadline.
        handle.start().unwrap();
        handle.focus_lost(FocusLossReason::WindowBlurred).unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;

        let snapshot = handle.snapshot();
        assert_eq!(
            api.reports(),
            vec![("00:03".to_string(), "window blurred".to_string())]
        );
        assert_eq!(snapshot.phase, SessionPhase::Violated);
        assert!(!snapshot.running);
        assert_eq!(snapshot.elapsed_secs, 3);
        assert_eq!(snapshot.focus_duration, "00:03");
    }

    #[tokio::test(start_paused = true)]
    async fn test_resync_picks_up_missed_change() {
        let api = FakeApi::new(response(StudentStatus::Normal, None));
        let handle = spawn_monitor(&api);
        settle().await;

        api.set_server(response(StudentStatus::Remedial, Some(intervention(5))));
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(handle.snapshot().status, StudentStatus::Normal);
        assert_eq!(api.fetch_count(), 1);

        handle.resync().unwrap();
        settle().await;
        let snapshot = handle.snapshot();
        assert_eq!(api.fetch_count(), 2);
        assert_eq!(snapshot.status, StudentStatus::Remedial);
        assert_eq!(snapshot.intervention.as_ref().map(|i| i.id), Some(5));
        assert!(!snapshot.loading);
        assert!(snapshot.has_activity("Synced status with server"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_fetch_does_not_overwrite_newer_one() {
        let api = FakeApi::new(response(StudentStatus::Normal, None));
        let handle = spawn_monitor(&api);
        settle().await;
        assert_eq!(api.fetch_count(), 1);

        let gate_a = api.gate_next_fetch();
        let gate_b = api.gate_next_fetch();
        handle.refresh().unwrap();
        settle().await;
        handle.refresh().unwrap();
        settle().await;
        assert_eq!(api.fetch_count(), 3);
        assert!(handle.snapshot().loading);

        gate_b
            .send(response(StudentStatus::Remedial, Some(intervention(4))))
            .unwrap();
        settle().await;
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.status, StudentStatus::Remedial);
        assert!(!snapshot.loading);

        gate_a.send(response(StudentStatus::Normal, None)).unwrap();
        settle().await;
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.status, StudentStatus::Remedial);
        assert_eq!(snapshot.intervention.map(|i| i.id), Some(4));
        assert!(!snapshot.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_supersedes_in_flight_fetch() {
        let api = FakeApi::new(response(StudentStatus::Normal, None));
        let handle = spawn_monitor(&api);
        settle().await;

        let gate = api.gate_next_fetch();
        handle.refresh().unwrap();
        settle().await;
        handle
            .apply_push(StatusUpdate {
                status: StudentStatus::Remedial,
                intervention: Some(intervention(9)),
            })
            .unwrap();
        settle().await;

        gate.send(response(StudentStatus::Normal, None)).unwrap();
        settle().await;
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.status, StudentStatus::Remedial);
        assert_eq!(snapshot.intervention.as_ref().map(|i| i.id), Some(9));
        assert!(!snapshot.loading);
        assert!(snapshot.has_activity("Status changed to remedial"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_only_while_decision_pending() {
        let api = FakeApi::new(response(StudentStatus::NeedsIntervention, None));
        let handle = spawn_monitor(&api);
        settle().await;
        assert_eq!(api.fetch_count(), 1);

        tokio::time::sleep(Duration::from_millis(10_500)).await;
        assert_eq!(api.fetch_count(), 2);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(api.fetch_count(), 3);

        api.set_server(response(StudentStatus::Normal, None));
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(api.fetch_count(), 4);
        assert_eq!(handle.snapshot().status, StudentStatus::Normal);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(api.fetch_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkin_validates_score_locally() {
        let api = FakeApi::new(response(StudentStatus::Normal, None));
        let handle = spawn_monitor(&api);
        handle.submit_checkin(11).unwrap();
        settle().await;

        let snapshot = handle.snapshot();
        assert_eq!(
            snapshot.alert,
            Some(Alert {
                title: "Invalid score".into(),
                message: "Score must be 1–10".into(),
            })
        );
        assert!(api.checkins.lock().unwrap().is_empty());

        handle.dismiss_alert().unwrap();
        settle().await;
        assert!(handle.snapshot().alert.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkin_sends_session_minutes() {
        let api = FakeApi::new(response(StudentStatus::Normal, None));
        let handle = spawn_monitor(&api);
        handle.start().unwrap();
        tokio::time::sleep(Duration::from_secs(61 * 60)).await;
        handle.submit_checkin(9).unwrap();
        settle().await;

        assert_eq!(*api.checkins.lock().unwrap(), vec![(9, 61)]);
        let snapshot = handle.snapshot();
        assert_eq!(
            snapshot.last_checkin.map(|o| o.status),
            Some("On Track".to_string())
        );
        assert_eq!(snapshot.status, StudentStatus::Normal);
        assert!(!snapshot.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_intervention_clears_violation() {
        let api = FakeApi::new(response(StudentStatus::Remedial, Some(intervention(3))));
        let handle = spawn_monitor(&api);
        settle().await;

        handle.complete_intervention().unwrap();
        settle().await;

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.status, StudentStatus::Normal);
        assert!(snapshot.intervention.is_none());
        assert!(!snapshot.violated);
        assert!(snapshot.has_activity("Intervention completed"));

        // Nothing cached any more.
        handle.complete_intervention().unwrap();
        settle().await;
        assert_eq!(
            handle.snapshot().alert.map(|a| a.title),
            Some("No intervention".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_log_is_capped_newest_first() {
        let api = FakeApi::new(response(StudentStatus::Normal, None));
        let handle = spawn_monitor(&api);
        for _ in 0..20 {
            handle.start().unwrap();
            handle.stop().unwrap();
        }
        handle.reset().unwrap();
        settle().await;

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.activity.len(), ACTIVITY_LOG_CAPACITY);
        assert_eq!(snapshot.activity[0].message, "Session reset");
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_closes_handle() {
        let api = FakeApi::new(response(StudentStatus::Normal, None));
        let api_dyn: Arc<dyn StatusApi> = api.clone();
        let (handle, task) = FocusMonitor::spawn(api_dyn, &ClientConfig::default());
        handle.shutdown();
        task.await.unwrap();

        assert!(handle.is_closed());
        assert!(matches!(handle.start(), Err(ClientError::MonitorClosed)));
    }
}
