//! Lazy Sleep - delayed shutdown scheduling with a live countdown
//!
//! The core is a session that resolves a duration from either the preset
//! slider or custom hours/minutes, schedules the OS shutdown, keeps a
//! drift-free countdown, offers a last-chance cancel prompt, and fades the
//! window out while the pointer is away.

pub mod api;
pub mod config;
pub mod display;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod time_source;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use api::{create_router, AppContext};
pub use config::Config;
pub use error::{SessionError, SessionResult};
pub use state::Session;
pub use utils::signals::shutdown_signal;
