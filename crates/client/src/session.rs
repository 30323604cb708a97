// crates/client/src/session.rs
//! The focus-session timer and its focus-loss grace countdown.
//!
//! `FocusSession` is a plain state machine: callers pass the current
//! [`Instant`] into every transition and schedule the grace deadline
//! themselves. Elapsed time is always derived from instants, so a delayed
//! or skipped display tick never drifts the counter.

use std::fmt;
use std::time::Duration;

use focus_guard_core::format_focus_duration;
use tokio::time::Instant;

/// How long focus may be lost before it counts as a violation.
pub const FOCUS_LOSS_GRACE: Duration = Duration::from_millis(3000);

/// What the platform reported when focus went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusLossReason {
    WindowBlurred,
    WindowHidden,
    AppBackgrounded,
}

impl FocusLossReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FocusLossReason::WindowBlurred => "window blurred",
            FocusLossReason::WindowHidden => "window hidden",
            FocusLossReason::AppBackgrounded => "app backgrounded",
        }
    }
}

impl fmt::Display for FocusLossReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    /// Not counting. Elapsed time may be non-zero after a stop.
    #[default]
    Idle,
    Running,
    /// Counting, with a focus-loss countdown armed.
    GracePending,
    /// A violation fired; the counter is frozen until the next start.
    Violated,
}

/// An armed grace countdown. Only the latest generation may fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraceDeadline {
    pub generation: u64,
    pub at: Instant,
}

/// A finalized focus violation, ready to be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Elapsed time at the moment of the violation, `MM:SS`.
    pub focus_duration: String,
    pub focus_minutes: i64,
    pub reason: FocusLossReason,
}

#[derive(Debug)]
pub struct FocusSession {
    phase: SessionPhase,
    accumulated: Duration,
    running_since: Option<Instant>,
    violated: bool,
    grace: Option<(GraceDeadline, FocusLossReason)>,
    generation: u64,
    grace_period: Duration,
}

impl Default for FocusSession {
    fn default() -> Self {
        Self::new(FOCUS_LOSS_GRACE)
    }
}

impl FocusSession {
    pub fn new(grace_period: Duration) -> Self {
        Self {
            phase: SessionPhase::Idle,
            accumulated: Duration::ZERO,
            running_since: None,
            violated: false,
            grace: None,
            generation: 0,
            grace_period,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// True while the counter advances, including during a grace countdown.
    pub fn is_running(&self) -> bool {
        matches!(self.phase, SessionPhase::Running | SessionPhase::GracePending)
    }

    pub fn violated(&self) -> bool {
        self.violated
    }

    pub fn pending_deadline(&self) -> Option<GraceDeadline> {
        self.grace.map(|(deadline, _)| deadline)
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        let live = self
            .running_since
            .map(|since| now.saturating_duration_since(since))
            .unwrap_or(Duration::ZERO);
        self.accumulated + live
    }

    pub fn elapsed_secs(&self, now: Instant) -> u64 {
        self.elapsed(now).as_secs()
    }

    pub fn focus_minutes(&self, now: Instant) -> i64 {
        (self.elapsed_secs(now) / 60) as i64
    }

    pub fn focus_duration(&self, now: Instant) -> String {
        format_focus_duration(self.elapsed_secs(now))
    }

    /// Begin or resume counting. Clears any earlier violation.
    ///
    /// Returns false if the session was already running.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.is_running() {
            return false;
        }
        self.cancel_grace();
        self.violated = false;
        self.running_since = Some(now);
        self.phase = SessionPhase::Running;
        true
    }

    /// Arm (or re-arm) the grace countdown. Ignored unless running.
    pub fn focus_lost(&mut self, now: Instant, reason: FocusLossReason) -> Option<GraceDeadline> {
        if !self.is_running() {
            return None;
        }
        self.generation += 1;
        let deadline = GraceDeadline {
            generation: self.generation,
            at: now + self.grace_period,
        };
        self.grace = Some((deadline, reason));
        self.phase = SessionPhase::GracePending;
        Some(deadline)
    }

    /// Focus came back before the countdown finished.
    pub fn focus_regained(&mut self) -> bool {
        if self.phase != SessionPhase::GracePending {
            return false;
        }
        self.cancel_grace();
        self.phase = SessionPhase::Running;
        true
    }

    /// The countdown for `generation` reached its deadline.
    ///
    /// Fires at most once per armed countdown; stale generations and early
    /// calls return `None`.
    pub fn grace_elapsed(&mut self, now: Instant, generation: u64) -> Option<Violation> {
        let (deadline, reason) = self.grace?;
        if self.phase != SessionPhase::GracePending
            || deadline.generation != generation
            || now < deadline.at
        {
            return None;
        }

        self.freeze(now);
        self.grace = None;
        self.violated = true;
        self.phase = SessionPhase::Violated;
        Some(Violation {
            focus_duration: format_focus_duration(self.accumulated.as_secs()),
            focus_minutes: (self.accumulated.as_secs() / 60) as i64,
            reason,
        })
    }

    /// Stop counting. Elapsed time and the violation flag are kept.
    pub fn stop(&mut self, now: Instant) {
        self.freeze(now);
        self.cancel_grace();
        if self.phase != SessionPhase::Violated {
            self.phase = SessionPhase::Idle;
        }
    }

    pub fn reset(&mut self) {
        self.cancel_grace();
        self.accumulated = Duration::ZERO;
        self.running_since = None;
        self.violated = false;
        self.phase = SessionPhase::Idle;
    }

    /// Drop the violation flag once the resulting intervention is resolved.
    pub fn clear_violation(&mut self) {
        self.violated = false;
        if self.phase == SessionPhase::Violated {
            self.phase = SessionPhase::Idle;
        }
    }

    fn freeze(&mut self, now: Instant) {
        self.accumulated = self.elapsed(now);
        self.running_since = None;
    }

    fn cancel_grace(&mut self) {
        if self.grace.take().is_some() {
            self.generation += 1;
        }
    }
}
