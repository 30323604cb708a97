// crates/core/src/duration.rs
//! "MM:SS" focus-duration strings, as shown on the client timer.

use crate::error::CoreError;

/// Format elapsed seconds as zero-padded `MM:SS`. Minutes are not wrapped at
/// 60, so a two-hour session renders as `120:00`.
pub fn format_focus_duration(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Parse a `MM:SS` string into whole minutes (seconds are truncated).
///
/// A bare integer is accepted as minutes.
pub fn parse_focus_duration(value: &str) -> Result<i64, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::invalid_duration(value));
    }

    let Some((mins, secs)) = trimmed.split_once(':') else {
        return trimmed
            .parse::<u32>()
            .map(i64::from)
            .map_err(|_| CoreError::invalid_duration(value));
    };

    let mins: u32 = mins
        .parse()
        .map_err(|_| CoreError::invalid_duration(value))?;
    let secs: u32 = secs
        .parse()
        .map_err(|_| CoreError::invalid_duration(value))?;
    if secs >= 60 {
        return Err(CoreError::invalid_duration(value));
    }
    Ok(i64::from(mins))
}
