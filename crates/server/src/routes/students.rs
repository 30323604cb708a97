//! Student status, check-in, violation and intervention endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use focus_guard_core::{
    parse_focus_duration, AssignInterventionRequest, AssignInterventionResponse, CheckinRequest,
    CompleteInterventionRequest, OutcomeResponse, StatusResponse, SuccessResponse,
    ViolationRequest,
};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// A present, non-blank string field.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Resolve focus minutes from `focus_minutes`, falling back to a `MM:SS`
/// `focus_duration`. `Ok(None)` means neither was supplied.
fn focus_minutes(minutes: Option<i64>, duration: Option<&str>) -> ApiResult<Option<i64>> {
    let minutes = match (minutes, duration) {
        (Some(m), _) => m,
        (None, Some(d)) => {
            parse_focus_duration(d).map_err(|e| ApiError::BadRequest(e.to_string()))?
        }
        (None, None) => return Ok(None),
    };
    if minutes < 0 {
        return Err(ApiError::BadRequest(
            "focus_minutes must not be negative".to_string(),
        ));
    }
    Ok(Some(minutes))
}

/// GET /api/student/{id}/status - Current status plus latest pending intervention.
async fn get_student_status(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    Ok(Json(state.service.get_status(&student_id).await?))
}

/// POST /api/daily-checkin
async fn daily_checkin(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CheckinRequest>, JsonRejection>,
) -> ApiResult<Json<OutcomeResponse>> {
    let Json(body) = body?;
    let focus = focus_minutes(body.focus_minutes, body.focus_duration.as_deref())?;
    let (Some(student_id), Some(quiz_score), Some(focus)) =
        (present(body.student_id), body.quiz_score, focus)
    else {
        return Err(ApiError::missing_fields(&[
            "student_id",
            "quiz_score",
            "focus_minutes",
        ]));
    };

    let outcome = state
        .service
        .record_checkin(&student_id, quiz_score, focus)
        .await?;
    Ok(Json(outcome))
}

/// POST /api/report-cheat
async fn report_cheat(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ViolationRequest>, JsonRejection>,
) -> ApiResult<Json<OutcomeResponse>> {
    let Json(body) = body?;
    let focus = focus_minutes(body.focus_minutes, body.focus_duration.as_deref())?;
    let (Some(student_id), Some(focus)) = (present(body.student_id), focus) else {
        return Err(ApiError::missing_fields(&["student_id", "focus_minutes"]));
    };

    let outcome = state
        .service
        .record_violation(&student_id, focus, body.reason.as_deref())
        .await?;
    Ok(Json(outcome))
}

/// POST /api/assign-intervention
async fn assign_intervention(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AssignInterventionRequest>, JsonRejection>,
) -> ApiResult<Json<AssignInterventionResponse>> {
    let Json(body) = body?;
    let (Some(student_id), Some(task)) = (present(body.student_id), present(body.task_description))
    else {
        return Err(ApiError::missing_fields(&["student_id", "task_description"]));
    };

    let intervention = state.service.assign_intervention(&student_id, &task).await?;
    Ok(Json(AssignInterventionResponse {
        success: true,
        intervention_id: intervention.id,
    }))
}

/// POST /api/complete-intervention
async fn complete_intervention(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CompleteInterventionRequest>, JsonRejection>,
) -> ApiResult<Json<SuccessResponse>> {
    let Json(body) = body?;
    let (Some(student_id), Some(intervention_id)) = (present(body.student_id), body.intervention_id)
    else {
        return Err(ApiError::missing_fields(&["student_id", "intervention_id"]));
    };

    state
        .service
        .complete_intervention(&student_id, intervention_id)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// Create the student routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/student/{id}/status", get(get_student_status))
        .route("/daily-checkin", post(daily_checkin))
        .route("/report-cheat", post(report_cheat))
        .route("/assign-intervention", post(assign_intervention))
        .route("/complete-intervention", post(complete_intervention))
}
