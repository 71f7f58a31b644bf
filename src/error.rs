//! Session error kinds

use thiserror::Error;

use crate::time_source::TimeSource;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The OS refused or failed to schedule the shutdown; nothing was recorded
    #[error("failed to schedule shutdown: {0}")]
    ScheduleActionFailed(String),

    /// The OS cancel command failed; the local schedule was still dropped
    #[error("failed to cancel shutdown: {0}")]
    CancelActionFailed(String),

    #[error("a shutdown is already scheduled")]
    AlreadyActive,

    #[error("another schedule or cancel request is in progress")]
    Busy,

    #[error("{0:?} input is locked while a shutdown is scheduled")]
    ControlsLocked(TimeSource),

    /// The user answered "no" to the immediate-shutdown confirmation
    #[error("immediate shutdown was declined")]
    Declined,
}

pub type SessionResult<T> = Result<T, SessionError>;
