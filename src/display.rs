//! Countdown and clock-time rendering

use chrono::{DateTime, Local, Timelike};
use serde::{Deserialize, Serialize};

/// Shown in place of a shutdown time when nothing is requested
pub const NO_TIME: &str = "--:--:-- --";

/// What the front-end should currently render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    /// Projected (idle) or fixed (scheduled) shutdown time of day
    pub shutdown_at: String,
    /// Remaining time while a schedule is active
    pub countdown: Option<String>,
}

impl DisplayState {
    pub fn new() -> Self {
        Self {
            shutdown_at: NO_TIME.to_string(),
            countdown: None,
        }
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::new()
    }
}

/// Remaining time until `target`, floored to whole seconds and never negative
pub fn remaining_seconds(target: DateTime<Local>, now: DateTime<Local>) -> u64 {
    let remaining = target.signed_duration_since(now).num_milliseconds().max(0);
    (remaining / 1000) as u64
}

/// Render a second count as `HH:MM:SS`
pub fn format_countdown(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Render a wall-clock instant as a 12-hour time of day, e.g. `9:05:07 PM`
pub fn format_time_of_day(at: DateTime<Local>) -> String {
    let (pm, hour) = at.hour12();
    format!(
        "{}:{:02}:{:02} {}",
        hour,
        at.minute(),
        at.second(),
        if pm { "PM" } else { "AM" }
    )
}
