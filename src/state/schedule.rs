//! Schedule lifecycle types

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

use crate::time_source::TimeSource;

/// Long schedules get a "cancel shutdown?" prompt this many seconds before expiry
pub const PROMPT_LEAD_SECONDS: u64 = 180;

/// Scheduling state machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    /// Waiting on the immediate-shutdown confirmation or the OS schedule call
    Requesting,
    Scheduled,
    /// Waiting on the OS cancel call
    Cancelling,
    /// Countdown reached zero but the process is still running
    Fired,
}

impl Phase {
    /// Whether a schedule is held locally
    pub fn is_active(self) -> bool {
        matches!(self, Phase::Scheduled | Phase::Cancelling | Phase::Fired)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Full,
    TimerCompact,
}

impl ViewMode {
    pub fn for_active(active: bool) -> Self {
        if active {
            ViewMode::TimerCompact
        } else {
            ViewMode::Full
        }
    }
}

/// One in-flight shutdown request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    /// Distinguishes schedules so stale timers never act on a newer one
    pub id: u64,
    pub target: DateTime<Local>,
    pub total_seconds: u64,
    /// The input whose controls are locked until the schedule ends
    pub source: TimeSource,
}

impl Schedule {
    pub fn new(id: u64, scheduled_at: DateTime<Local>, total_seconds: u64, source: TimeSource) -> Self {
        Self {
            id,
            target: scheduled_at + Duration::seconds(total_seconds as i64),
            total_seconds,
            source,
        }
    }

    /// Delay from scheduling until the pre-expiry prompt, if one is due
    pub fn prompt_delay(&self) -> Option<std::time::Duration> {
        (self.total_seconds > PROMPT_LEAD_SECONDS)
            .then(|| std::time::Duration::from_secs(self.total_seconds - PROMPT_LEAD_SECONDS))
    }
}
