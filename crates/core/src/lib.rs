// crates/core/src/lib.rs
//! Shared domain types for focus-guard.
//!
//! Holds the student status model, the check-in rule, focus-duration
//! formatting and the JSON payloads exchanged between the server, the
//! realtime channel and the student client.

pub mod checkin;
pub mod duration;
pub mod error;
pub mod status;
pub mod types;

pub use checkin::{
    evaluate_checkin, CheckinVerdict, FOCUS_MINUTES_THRESHOLD, QUIZ_SCORE_THRESHOLD,
};
pub use duration::{format_focus_duration, parse_focus_duration};
pub use error::CoreError;
pub use status::{InterventionStatus, StudentStatus};
pub use types::*;
