// crates/core/src/status.rs
//! Student and intervention status enums.
//!
//! Both are stored as snake_case TEXT columns and travel over the wire in
//! the same form, so `as_str` and serde agree on every variant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The authoritative status a client branches its UI on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentStatus {
    /// Free to run focus sessions and submit check-ins.
    #[default]
    Normal,
    /// Locked until a mentor reviews the latest check-in or violation.
    NeedsIntervention,
    /// A remedial task has been assigned and is awaiting completion.
    Remedial,
}

impl StudentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Normal => "normal",
            StudentStatus::NeedsIntervention => "needs_intervention",
            StudentStatus::Remedial => "remedial",
        }
    }

    /// Whether a client holding this status must keep polling the server.
    pub fn requires_polling(&self) -> bool {
        matches!(
            self,
            StudentStatus::NeedsIntervention | StudentStatus::Remedial
        )
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(StudentStatus::Normal),
            "needs_intervention" => Ok(StudentStatus::NeedsIntervention),
            "remedial" => Ok(StudentStatus::Remedial),
            other => Err(CoreError::UnknownStudentStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionStatus {
    #[default]
    Pending,
    Completed,
}

impl InterventionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterventionStatus::Pending => "pending",
            InterventionStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for InterventionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterventionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InterventionStatus::Pending),
            "completed" => Ok(InterventionStatus::Completed),
            other => Err(CoreError::UnknownInterventionStatus(other.to_string())),
        }
    }
}
