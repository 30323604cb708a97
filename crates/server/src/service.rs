// crates/server/src/service.rs
//! Status Service: check-ins, violations and interventions.
//!
//! Every operation validates the student, performs one transactional store
//! write, then publishes the new status on the student's realtime channel.
//! Notification and broadcast failures are downgraded to warnings.

use std::sync::Arc;

use focus_guard_core::{
    evaluate_checkin, Intervention, OutcomeResponse, ServerMessage, StatusResponse, StatusUpdate,
    StudentStatus,
};
use focus_guard_db::{Database, NewDailyLog};
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::notifier::{MentorAlert, Notifier, NotifyOutcome};
use crate::realtime::Broadcaster;

/// Log label used when a violation report carries no reason.
pub const DEFAULT_VIOLATION_REASON: &str = "cheated";

/// How a mentor notification attempt ended, from the caller's view.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Delivery {
    Sent,
    Skipped(String),
    Failed,
}

#[derive(Clone)]
pub struct StatusService {
    db: Database,
    realtime: Broadcaster,
    notifier: Arc<dyn Notifier>,
}

impl StatusService {
    pub fn new(db: Database, realtime: Broadcaster, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db,
            realtime,
            notifier,
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub async fn get_status(&self, student_id: &str) -> ApiResult<StatusResponse> {
        let student = self
            .db
            .get_student(student_id)
            .await?
            .ok_or_else(|| ApiError::StudentNotFound(student_id.to_string()))?;
        let intervention = self.db.latest_pending_intervention(student_id).await?;
        Ok(StatusResponse {
            student,
            intervention,
        })
    }

    pub async fn record_checkin(
        &self,
        student_id: &str,
        quiz_score: i64,
        focus_minutes: i64,
    ) -> ApiResult<OutcomeResponse> {
        let verdict = evaluate_checkin(quiz_score, focus_minutes);
        let status = verdict.student_status();
        let log = NewDailyLog::new(quiz_score, focus_minutes, verdict.log_label());

        self.write_status(student_id, status, Some(&log)).await?;
        info!(
            student_id = %student_id,
            quiz_score,
            focus_minutes,
            status = %status,
            "Daily check-in recorded"
        );
        self.broadcast(student_id, StatusUpdate::status_only(status));

        if verdict.is_success() {
            return Ok(OutcomeResponse {
                status: verdict.response_label().to_string(),
                warning: None,
            });
        }

        let warning = match self.notify(student_id, quiz_score, focus_minutes).await {
            Delivery::Sent => None,
            Delivery::Skipped(message) => Some(message),
            Delivery::Failed => Some("Notification may have failed".to_string()),
        };
        Ok(OutcomeResponse {
            status: verdict.response_label().to_string(),
            warning,
        })
    }

    /// A focus violation always moves the student to `needs_intervention`.
    pub async fn record_violation(
        &self,
        student_id: &str,
        focus_minutes: i64,
        reason: Option<&str>,
    ) -> ApiResult<OutcomeResponse> {
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_VIOLATION_REASON);
        let log = NewDailyLog::new(0, focus_minutes, reason);

        self.write_status(student_id, StudentStatus::NeedsIntervention, Some(&log))
            .await?;
        info!(student_id = %student_id, focus_minutes, reason = %reason, "Focus violation recorded");
        self.broadcast(
            student_id,
            StatusUpdate::status_only(StudentStatus::NeedsIntervention),
        );

        let response = match self.notify(student_id, 0, focus_minutes).await {
            Delivery::Sent => OutcomeResponse {
                status: "Logged cheat and notified mentor".to_string(),
                warning: None,
            },
            Delivery::Skipped(message) => OutcomeResponse {
                status: "Logged cheat (notification skipped)".to_string(),
                warning: Some(message),
            },
            Delivery::Failed => OutcomeResponse {
                status: "Logged cheat (notification may have failed)".to_string(),
                warning: Some("Notification may have failed".to_string()),
            },
        };
        Ok(response)
    }

    pub async fn assign_intervention(
        &self,
        student_id: &str,
        task_description: &str,
    ) -> ApiResult<Intervention> {
        let intervention = self
            .db
            .assign_intervention(student_id, task_description)
            .await?
            .ok_or_else(|| ApiError::StudentNotFound(student_id.to_string()))?;
        info!(
            student_id = %student_id,
            intervention_id = intervention.id,
            "Intervention assigned"
        );

        self.broadcast(
            student_id,
            StatusUpdate {
                status: StudentStatus::Remedial,
                intervention: Some(intervention.clone()),
            },
        );
        Ok(intervention)
    }

    /// Completing returns the student to `normal` even if other pending
    /// interventions exist.
    pub async fn complete_intervention(
        &self,
        student_id: &str,
        intervention_id: i64,
    ) -> ApiResult<()> {
        let completed = self
            .db
            .complete_intervention(intervention_id, student_id)
            .await?;
        if !completed {
            return Err(ApiError::InterventionNotFound {
                student_id: student_id.to_string(),
                intervention_id,
            });
        }
        info!(student_id = %student_id, intervention_id, "Intervention completed");

        self.broadcast(student_id, StatusUpdate::status_only(StudentStatus::Normal));
        Ok(())
    }

    async fn write_status(
        &self,
        student_id: &str,
        status: StudentStatus,
        log: Option<&NewDailyLog>,
    ) -> ApiResult<()> {
        let written = self.db.record_status_event(student_id, status, log).await?;
        if !written {
            return Err(ApiError::StudentNotFound(student_id.to_string()));
        }
        Ok(())
    }

    async fn notify(&self, student_id: &str, quiz_score: i64, focus_minutes: i64) -> Delivery {
        let alert = MentorAlert::new(student_id, quiz_score, focus_minutes);
        match self.notifier.notify_mentor(&alert).await {
            Ok(NotifyOutcome::Sent) => Delivery::Sent,
            Ok(NotifyOutcome::Skipped { message, .. }) => Delivery::Skipped(message),
            Err(e) => {
                warn!(student_id = %student_id, error = %e, "Mentor notification failed");
                Delivery::Failed
            }
        }
    }

    /// Publish a status update. Never fails the caller.
    fn broadcast(&self, student_id: &str, update: StatusUpdate) {
        match serde_json::to_string(&ServerMessage::StatusUpdate(update)) {
            Ok(payload) => {
                let delivered = self.realtime.publish(student_id, &payload);
                debug!(student_id = %student_id, delivered, "Status update broadcast");
            }
            Err(e) => warn!(student_id = %student_id, error = %e, "Status broadcast skipped"),
        }
    }
}
