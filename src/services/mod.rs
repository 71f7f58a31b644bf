//! External collaborators
//!
//! The session only talks to the outside world through the traits in this
//! module: the OS shutdown command, user dialogs, the application window and
//! the wall clock. Concrete implementations for the headless binary live in
//! the submodules.

pub mod dialogs;
pub mod preferences;
pub mod system;
pub mod window;

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::state::{Opacity, Point, Rect, ViewMode};

// Re-export main implementations
pub use dialogs::{PendingPrompt, PromptBoard};
pub use preferences::{greeting, local_username, Theme, ThemeStore};
pub use system::{check_shutdown_available, DryRunShutdown, SystemShutdown};
pub use window::RemoteWindow;

/// Invokes and revokes the OS-level delayed shutdown
#[async_trait]
pub trait ShutdownAction: Send + Sync {
    async fn schedule(&self, seconds: u64) -> Result<(), String>;
    async fn cancel(&self) -> Result<(), String>;
}

/// Modal questions and notices shown to the user
#[async_trait]
pub trait Dialogs: Send + Sync {
    /// Ask a yes/no question; `true` means "yes"
    async fn confirm(&self, title: &str, message: &str) -> bool;
    async fn notify_info(&self, title: &str, message: &str);
    async fn notify_error(&self, title: &str, message: &str);
}

/// The application window as seen by the presence sensor and view switching
pub trait WindowSurface: Send + Sync {
    /// Current pointer position in screen coordinates
    fn pointer(&self) -> Point;
    fn bounds(&self) -> Rect;
    fn set_opacity(&self, opacity: Opacity);
    fn set_view_mode(&self, mode: ViewMode);
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Local wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
