// crates/core/src/types.rs
//! JSON payloads shared by the HTTP API, the realtime channel and the client.

use serde::{Deserialize, Serialize};

use crate::status::{InterventionStatus, StudentStatus};

/// A student row as returned by `GET /api/student/:id/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub status: StudentStatus,
    /// Unix seconds.
    pub created_at: i64,
    /// Unix seconds.
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intervention {
    pub id: i64,
    pub student_id: String,
    pub task_description: String,
    pub status: InterventionStatus,
    pub assigned_at: i64,
    #[serde(default)]
    pub completed_at: Option<i64>,
}

/// Current student state plus the most recent pending intervention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub student: Student,
    pub intervention: Option<Intervention>,
}

/// Pushed to every subscriber of a student's channel after a status write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: StudentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervention: Option<Intervention>,
}

impl StatusUpdate {
    pub fn status_only(status: StudentStatus) -> Self {
        Self {
            status,
            intervention: None,
        }
    }
}

/// Messages the server sends over the realtime socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    StatusUpdate(StatusUpdate),
    Joined { student_id: String },
    Error { message: String },
}

/// Messages a client sends over the realtime socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    JoinStudent { student_id: String },
}

// ============================================================================
// HTTP request bodies
// ============================================================================

/// `POST /api/daily-checkin`. Fields are optional so the server can answer
/// missing ones with a 400 of its own.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckinRequest {
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub quiz_score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_minutes: Option<i64>,
    /// `MM:SS`, accepted in place of `focus_minutes`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_duration: Option<String>,
}

/// `POST /api/report-cheat`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViolationRequest {
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_minutes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignInterventionRequest {
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub task_description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompleteInterventionRequest {
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub intervention_id: Option<i64>,
}

// ============================================================================
// HTTP response bodies
// ============================================================================

/// Response for check-ins and violation reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignInterventionResponse {
    pub success: bool,
    pub intervention_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}
