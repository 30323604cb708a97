// crates/core/src/error.rs
use thiserror::Error;

/// Errors produced while decoding domain values from storage or requests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown student status: {0}")]
    UnknownStudentStatus(String),

    #[error("Unknown intervention status: {0}")]
    UnknownInterventionStatus(String),

    #[error("Invalid focus duration '{value}': expected MM:SS")]
    InvalidFocusDuration { value: String },
}

impl CoreError {
    pub fn invalid_duration(value: impl Into<String>) -> Self {
        Self::InvalidFocusDuration {
            value: value.into(),
        }
    }
}
