//! State management module
//!
//! The session owns every piece of mutable state: the duration inputs, the
//! schedule lifecycle, presence sensing and the timers that drive them.

pub mod presence;
pub mod schedule;
pub mod session;

// Re-export main types
pub use presence::{Opacity, Point, PresenceState, Rect, DETECTION_RADIUS};
pub use schedule::{Phase, Schedule, ViewMode, PROMPT_LEAD_SECONDS};
pub use session::{CancelOutcome, Collaborators, Session, SessionSettings, SessionSnapshot};
