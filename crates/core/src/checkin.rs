// crates/core/src/checkin.rs
//! The daily check-in rule.

use crate::status::StudentStatus;

/// A check-in passes only with a quiz score strictly above this.
pub const QUIZ_SCORE_THRESHOLD: i64 = 7;

/// A check-in passes only with strictly more focus minutes than this.
pub const FOCUS_MINUTES_THRESHOLD: i64 = 60;

/// Outcome of evaluating one check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckinVerdict {
    OnTrack,
    NeedsReview,
}

impl CheckinVerdict {
    /// Status the student row moves to.
    pub fn student_status(&self) -> StudentStatus {
        match self {
            CheckinVerdict::OnTrack => StudentStatus::Normal,
            CheckinVerdict::NeedsReview => StudentStatus::NeedsIntervention,
        }
    }

    /// Label written to the daily log.
    pub fn log_label(&self) -> &'static str {
        match self {
            CheckinVerdict::OnTrack => "on_track",
            CheckinVerdict::NeedsReview => "needs_intervention",
        }
    }

    /// Human-readable label returned to the client.
    pub fn response_label(&self) -> &'static str {
        match self {
            CheckinVerdict::OnTrack => "On Track",
            CheckinVerdict::NeedsReview => "Pending Mentor Review",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CheckinVerdict::OnTrack)
    }
}

pub fn evaluate_checkin(quiz_score: i64, focus_minutes: i64) -> CheckinVerdict {
    if quiz_score > QUIZ_SCORE_THRESHOLD && focus_minutes > FOCUS_MINUTES_THRESHOLD {
        CheckinVerdict::OnTrack
    } else {
        CheckinVerdict::NeedsReview
    }
}
